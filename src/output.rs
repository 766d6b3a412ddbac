use crate::model::Product;
use crate::scraper::helpers::format_threshold;

pub fn format_banner(started_at: &str, send_email: bool) -> String {
    let mut out = String::new();
    out.push_str("Walmart Deals Scraper\n");
    out.push_str("=====================\n");
    out.push_str(&format!("Started at: {}\n", started_at));
    out.push_str(&format!(
        "Email sending: {}\n",
        if send_email { "ENABLED" } else { "DISABLED" }
    ));
    out
}

pub fn format_products(products: &[Product], threshold: f64) -> String {
    let limit = format_threshold(threshold);
    if products.is_empty() {
        return format!("No products found under {}.\n", limit);
    }

    let mut out = format!(
        "Found {} product(s) under {}:\n\n",
        products.len(),
        limit
    );
    for (i, product) in products.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, product.name));
        out.push_str(&format!("   Price: {}\n", product.price));
        out.push_str(&format!("   URL: {}\n", product.url));
        if let Some(ref image) = product.image_url {
            out.push_str(&format!("   Image: {}\n", image));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_products_with_optional_image() {
        let products = vec![
            Product {
                name: "Shirt".to_string(),
                price: "$1.99".to_string(),
                url: "https://www.walmart.com/ip/123".to_string(),
                image_url: Some("https://i5.walmartimages.com/s.jpg".to_string()),
            },
            Product {
                name: "Socks".to_string(),
                price: "$0.50".to_string(),
                url: "https://www.walmart.com/ip/456".to_string(),
                image_url: None,
            },
        ];
        let out = format_products(&products, 2.0);
        assert!(out.starts_with("Found 2 product(s) under $2:\n\n"));
        assert!(out.contains("1. Shirt\n   Price: $1.99\n   URL: https://www.walmart.com/ip/123\n   Image: https://i5.walmartimages.com/s.jpg\n"));
        assert!(out.contains("2. Socks\n   Price: $0.50\n   URL: https://www.walmart.com/ip/456\n\n"));
        assert_eq!(out.matches("Image:").count(), 1);
    }

    #[test]
    fn empty_listing() {
        assert_eq!(format_products(&[], 2.5), "No products found under $2.50.\n");
    }

    #[test]
    fn banner_reports_email_mode() {
        let out = format_banner("2026-01-01T00:00:00Z", true);
        assert!(out.contains("Started at: 2026-01-01T00:00:00Z"));
        assert!(out.contains("Email sending: ENABLED"));
        assert!(format_banner("x", false).contains("DISABLED"));
    }
}
