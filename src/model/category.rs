use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Depth of a category in the three-level hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryLevel {
    Main,
    Child,
    Subchild,
}

impl CategoryLevel {
    /// Level a category created under `self` gets.
    pub fn child_level(&self) -> Option<CategoryLevel> {
        match self {
            CategoryLevel::Main => Some(CategoryLevel::Child),
            CategoryLevel::Child => Some(CategoryLevel::Subchild),
            CategoryLevel::Subchild => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryLevel::Main => "main",
            CategoryLevel::Child => "child",
            CategoryLevel::Subchild => "subchild",
        }
    }
}

/// One node of the hierarchy. Parents are referenced by id; the tree shown in
/// the dashboard is derived from these records, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub parent_id: Option<ObjectId>,
    pub level: CategoryLevel,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLeaf {
    pub id: ObjectId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: ObjectId,
    pub name: String,
    pub subchildren: Vec<CategoryLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTree {
    pub id: ObjectId,
    pub name: String,
    pub children: Vec<CategoryNode>,
}

fn children_of(
    categories: &[Category],
    parent: ObjectId,
    level: CategoryLevel,
) -> impl Iterator<Item = (ObjectId, String)> + '_ {
    categories
        .iter()
        .filter(move |c| c.level == level && c.parent_id == Some(parent))
        .filter_map(|c| c.id.map(|id| (id, c.name.clone())))
}

/// Assemble display trees from flat records. Records with a missing id or
/// an unknown parent are left out. Siblings keep the input order.
pub fn build_trees(categories: &[Category]) -> Vec<CategoryTree> {
    categories
        .iter()
        .filter(|c| c.level == CategoryLevel::Main)
        .filter_map(|main| {
            let main_id = main.id?;
            let children = children_of(categories, main_id, CategoryLevel::Child)
                .map(|(child_id, child_name)| CategoryNode {
                    id: child_id,
                    name: child_name,
                    subchildren: children_of(categories, child_id, CategoryLevel::Subchild)
                        .map(|(id, name)| CategoryLeaf { id, name })
                        .collect(),
                })
                .collect();
            Some(CategoryTree {
                id: main_id,
                name: main.name.clone(),
                children,
            })
        })
        .collect()
}
