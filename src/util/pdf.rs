use genpdf::{elements, style, Element};
use std::path::Path;
use tracing::{debug, error};

use crate::config::DocumentConfig;
use crate::util::error::ServiceError;
use crate::util::export::QuoteDocument;

fn table_error(e: genpdf::error::Error) -> ServiceError {
    error!("Failed to lay out PDF table: {}", e);
    ServiceError::InternalError(format!("PDF layout failed: {}", e))
}

fn load_fonts(config: &DocumentConfig) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, ServiceError> {
    if !Path::new(&config.font_dir).is_dir() {
        return Err(ServiceError::Configuration(format!(
            "PDF font directory '{}' does not exist. Set PDF_FONT_DIR to a folder containing \
             {name}-Regular.ttf, {name}-Bold.ttf, {name}-Italic.ttf and {name}-BoldItalic.ttf",
            config.font_dir,
            name = config.font_name
        )));
    }
    genpdf::fonts::from_files(&config.font_dir, &config.font_name, None).map_err(|e| {
        error!("Failed to load font family '{}': {}", config.font_name, e);
        ServiceError::Configuration(format!(
            "Font family '{}' could not be loaded from '{}': {}. Check PDF_FONT_NAME",
            config.font_name, config.font_dir, e
        ))
    })
}

/// Render a priced document to PDF bytes.
pub fn render_pdf(document: &QuoteDocument, config: &DocumentConfig) -> Result<Vec<u8>, ServiceError> {
    let fonts = load_fonts(config)?;

    let mut doc = genpdf::Document::new(fonts);
    doc.set_title(match &document.number {
        Some(number) => format!("{} {}", document.title, number),
        None => document.title.clone(),
    });
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    let small = style::Style::new().with_font_size(10);

    // Issuer
    if let Some(company) = &document.company {
        doc.push(elements::Paragraph::new(company.name.as_str()).styled(style::Style::new().bold().with_font_size(16)));
        for detail in [&company.address, &company.phone, &company.email].into_iter().flatten() {
            doc.push(elements::Paragraph::new(detail.as_str()).styled(small));
        }
        if let Some(tax_id) = &company.tax_id {
            doc.push(elements::Paragraph::new(format!("Tax ID: {}", tax_id)).styled(small));
        }
        doc.push(elements::Break::new(1.5));
    }

    doc.push(elements::Paragraph::new(document.title.to_uppercase()).styled(style::Style::new().bold().with_font_size(14)));
    if let Some(number) = &document.number {
        doc.push(elements::Paragraph::new(format!("No. {}", number)));
    }
    if let Some(date) = &document.date {
        doc.push(elements::Paragraph::new(format!("Date: {}", date)));
    }
    if let Some(due) = &document.due_date {
        doc.push(elements::Paragraph::new(format!("Due: {}", due)));
    }
    doc.push(elements::Break::new(1));

    doc.push(elements::Paragraph::new(format!("Customer: {}", document.customer.name)));
    doc.push(elements::Paragraph::new(format!("Phone: {}", document.customer.phone)));
    if let Some(email) = &document.customer.email {
        doc.push(elements::Paragraph::new(format!("Email: {}", email)));
    }
    if let Some(address) = &document.customer.address {
        doc.push(elements::Paragraph::new(format!("Address: {}", address)));
    }
    doc.push(elements::Break::new(2));

    let mut table = elements::TableLayout::new(vec![1, 5, 3, 1, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("#").styled(bold))
        .element(elements::Paragraph::new("Item").styled(bold))
        .element(elements::Paragraph::new("Variant").styled(bold))
        .element(elements::Paragraph::new("Qty").styled(bold))
        .element(elements::Paragraph::new("Unit").styled(bold))
        .element(elements::Paragraph::new("Total").styled(bold))
        .push()
        .map_err(table_error)?;

    for (position, line) in document.lines.iter().enumerate() {
        table
            .row()
            .element(elements::Paragraph::new(format!("{}", position + 1)))
            .element(elements::Paragraph::new(line.name.as_str()))
            .element(elements::Paragraph::new(line.variant.clone().unwrap_or_default()))
            .element(elements::Paragraph::new(line.quantity.to_string()))
            .element(elements::Paragraph::new(format!("{:.2}", line.unit_price)))
            .element(elements::Paragraph::new(format!("{:.2}", line.total)))
            .push()
            .map_err(table_error)?;
    }

    doc.push(table);
    doc.push(elements::Break::new(1.5));

    let mut total = elements::Paragraph::new(format!("TOTAL: {:.2}", document.grand_total));
    total.set_alignment(genpdf::Alignment::Right);
    doc.push(total.styled(style::Style::new().bold().with_font_size(12)));
    doc.push(elements::Paragraph::new(document.amount_in_words.as_str()).styled(style::Style::new().italic()));

    if let Some(note) = &document.note {
        doc.push(elements::Break::new(1.5));
        doc.push(elements::Paragraph::new(format!("Note: {}", note)).styled(small));
    }

    if let Some(company) = &document.company {
        if let (Some(bank), Some(account)) = (&company.bank_name, &company.bank_account) {
            doc.push(elements::Break::new(2));
            doc.push(
                elements::Paragraph::new(format!("Bank: {} / Account: {}", bank, account))
                    .styled(style::Style::new().italic().with_font_size(8)),
            );
        }
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(|e| {
        error!("Failed to render PDF: {}", e);
        ServiceError::InternalError(format!("PDF rendering failed: {}", e))
    })?;
    debug!("Rendered {} ({} bytes)", document.title, buffer.len());
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::document_conf::CurrencyWords;
    use crate::model::quote::{DocumentKind, Quote};
    use crate::util::export::build_document;

    #[test]
    fn test_missing_font_directory_is_a_configuration_error() {
        let quote: Quote = serde_json::from_value(serde_json::json!({
            "customerName": "Amina",
            "customerPhone": "0550",
            "items": []
        }))
        .unwrap();
        let document = build_document(&quote, DocumentKind::Quote, &[], &CurrencyWords::default()).unwrap();
        let config = DocumentConfig {
            font_dir: "./no-such-font-dir".to_string(),
            ..DocumentConfig::default()
        };
        let err = render_pdf(&document, &config).unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(msg) if msg.contains("PDF_FONT_DIR")));
    }
}
