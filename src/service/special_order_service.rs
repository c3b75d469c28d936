use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::special_order_dto::{SpecialOrderRequest, SpecialOrderStatusRequest};
use crate::model::special_order::SpecialOrder;
use crate::repository::special_order_repo::SpecialOrderRepository;
use crate::util::error::ServiceError;
use crate::util::time::DateRange;

#[async_trait]
pub trait SpecialOrderService: Send + Sync {
    async fn create_order(&self, request: SpecialOrderRequest) -> Result<SpecialOrder, ServiceError>;
    async fn get_order(&self, id: ObjectId) -> Result<SpecialOrder, ServiceError>;
    async fn list_orders(&self, range: DateRange) -> Result<Vec<SpecialOrder>, ServiceError>;
    async fn update_order(&self, id: ObjectId, request: SpecialOrderRequest) -> Result<SpecialOrder, ServiceError>;
    async fn update_status(&self, id: ObjectId, request: SpecialOrderStatusRequest) -> Result<SpecialOrder, ServiceError>;
    async fn delete_order(&self, id: ObjectId) -> Result<(), ServiceError>;
}

pub struct SpecialOrderServiceImpl {
    pub order_repo: Arc<dyn SpecialOrderRepository>,
}

impl SpecialOrderServiceImpl {
    pub fn new(order_repo: Arc<dyn SpecialOrderRepository>) -> Self {
        SpecialOrderServiceImpl { order_repo }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn apply(order: &mut SpecialOrder, request: SpecialOrderRequest) {
    order.customer_name = request.customer_name.trim().to_string();
    order.customer_phone = request.customer_phone.trim().to_string();
    order.customer_email = trimmed(request.customer_email);
    order.product_name = request.product_name.trim().to_string();
    order.description = trimmed(request.description);
    order.quantity = request.quantity;
    order.budget = request.budget;
    if let Some(status) = request.status {
        order.status = status;
    }
    if request.admin_note.is_some() {
        order.admin_note = trimmed(request.admin_note);
    }
}

#[async_trait]
impl SpecialOrderService for SpecialOrderServiceImpl {
    #[instrument(skip(self, request), fields(customer = %request.customer_name))]
    async fn create_order(&self, request: SpecialOrderRequest) -> Result<SpecialOrder, ServiceError> {
        let mut order = SpecialOrder {
            id: None,
            customer_name: String::new(),
            customer_phone: String::new(),
            customer_email: None,
            product_name: String::new(),
            description: None,
            quantity: 1,
            budget: None,
            status: Default::default(),
            admin_note: None,
            created_at: None,
            updated_at: None,
        };
        apply(&mut order, request);
        Ok(self.order_repo.create(order).await?)
    }

    async fn get_order(&self, id: ObjectId) -> Result<SpecialOrder, ServiceError> {
        Ok(self.order_repo.get_by_id(id).await?)
    }

    async fn list_orders(&self, range: DateRange) -> Result<Vec<SpecialOrder>, ServiceError> {
        Ok(self.order_repo.list(&range).await?)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    async fn update_order(&self, id: ObjectId, request: SpecialOrderRequest) -> Result<SpecialOrder, ServiceError> {
        let mut order = self.order_repo.get_by_id(id).await?;
        apply(&mut order, request);
        Ok(self.order_repo.replace(order).await?)
    }

    #[instrument(skip(self, request), fields(id = %id, status = request.status.as_str()))]
    async fn update_status(&self, id: ObjectId, request: SpecialOrderStatusRequest) -> Result<SpecialOrder, ServiceError> {
        let mut order = self.order_repo.get_by_id(id).await?;
        order.status = request.status;
        if request.admin_note.is_some() {
            order.admin_note = trimmed(request.admin_note);
        }
        let saved = self.order_repo.replace(order).await?;
        info!("Special order {} moved to {}", id, saved.status.as_str());
        Ok(saved)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_order(&self, id: ObjectId) -> Result<(), ServiceError> {
        Ok(self.order_repo.delete(id).await?)
    }
}
