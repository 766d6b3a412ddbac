use crate::config::EmailConfig;
use crate::error::ScrapeError;
use crate::model::Product;
use crate::scraper::helpers::format_threshold;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Search summary shared by the subject and both bodies.
#[derive(Debug, Clone, Copy)]
pub struct Digest<'a> {
    pub products: &'a [Product],
    pub query: &'a str,
    pub threshold: f64,
}

impl Digest<'_> {
    pub fn subject(&self) -> String {
        format!(
            "\u{1F389} Found {} {} Deal(s) Under {} at Walmart!",
            self.products.len(),
            title_case(self.query),
            format_threshold(self.threshold)
        )
    }

    pub fn plain_text(&self) -> String {
        let listing: Vec<String> = self
            .products
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {} - {}\n   {}", i + 1, p.name, p.price, p.url))
            .collect();
        format!(
            "Walmart {} Deals Found!\n\nFound {} item(s) under {}:\n\n{}",
            title_case(self.query),
            self.products.len(),
            format_threshold(self.threshold),
            listing.join("\n\n")
        )
    }

    pub fn html(&self) -> String {
        let rows: String = self
            .products
            .iter()
            .enumerate()
            .map(|(i, p)| product_row(i + 1, p))
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
    .header {{ background-color: #004c91; color: white; padding: 20px; text-align: center; }}
    .content {{ background-color: #f9f9f9; padding: 20px; }}
    .product-list {{ width: 100%; border-collapse: collapse; }}
    .footer {{ text-align: center; padding: 20px; color: #666; font-size: 12px; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>Walmart {title} Deals Found!</h1>
    </div>
    <div class="content">
      <p>Found <strong>{count}</strong> item(s) under {limit}:</p>
      <table class="product-list">
{rows}      </table>
    </div>
    <div class="footer">
      <p>This email was sent automatically by walmart-deals</p>
    </div>
  </div>
</body>
</html>
"#,
            title = escape_html(&title_case(self.query)),
            count = self.products.len(),
            limit = escape_html(&format_threshold(self.threshold)),
            rows = rows,
        )
    }
}

fn product_row(index: usize, product: &Product) -> String {
    let image_cell = match product.image_url {
        Some(ref src) => format!(
            r#"<td style="width: 120px; vertical-align: top; padding-right: 15px;"><img src="{}" alt="{}" style="max-width: 120px; height: auto; border-radius: 4px;" /></td>"#,
            escape_html(src),
            escape_html(&product.name)
        ),
        None => String::new(),
    };
    format!(
        r#"        <tr style="border-bottom: 1px solid #eee;">
          <td style="padding: 10px;">
            <table style="width: 100%;"><tr>{image}<td style="vertical-align: top;">
              <strong>{index}. {name}</strong><br>
              <span style="color: #e31837; font-size: 18px; font-weight: bold;">{price}</span><br>
              <a href="{url}" style="color: #0066cc; text-decoration: none;">View Product &rarr;</a>
            </td></tr></table>
          </td>
        </tr>
"#,
        image = image_cell,
        index = index,
        name = escape_html(&product.name),
        price = escape_html(&product.price),
        url = escape_html(&product.url),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// One multipart/alternative message (plain text + HTML) from the sender to the recipient.
    pub fn build_message(&self, digest: &Digest<'_>) -> Result<Message, ScrapeError> {
        let from: Mailbox = self.config.user.parse().map_err(|e| {
            ScrapeError::Config(format!("Invalid GMAIL_USER '{}': {}", self.config.user, e))
        })?;
        let to: Mailbox = self.config.recipient.parse().map_err(|e| {
            ScrapeError::Config(format!(
                "Invalid EMAIL_RECIPIENT '{}': {}",
                self.config.recipient, e
            ))
        })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(digest.subject())
            .multipart(MultiPart::alternative_plain_html(
                digest.plain_text(),
                digest.html(),
            ))
            .map_err(|e| ScrapeError::Delivery(format!("Failed to build message: {}", e)))
    }

    /// Single delivery attempt over authenticated SMTP.
    pub async fn send(&self, digest: &Digest<'_>) -> Result<(), ScrapeError> {
        let message = self.build_message(digest)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| ScrapeError::Delivery(format!("SMTP setup failed: {}", e)))?
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ))
            .build();

        tracing::info!("Sending email to {}", self.config.recipient);
        let response = transport
            .send(message)
            .await
            .map_err(|e| ScrapeError::Delivery(e.to_string()))?;
        tracing::info!("Email sent successfully: {}", response.code());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> Vec<Product> {
        vec![
            Product {
                name: "Tee <Kids> & \"Co\"".to_string(),
                price: "$1.99".to_string(),
                url: "https://www.walmart.com/ip/1".to_string(),
                image_url: Some("https://i5.walmartimages.com/1.jpg".to_string()),
            },
            Product {
                name: "Socks".to_string(),
                price: "$0.50".to_string(),
                url: "https://www.walmart.com/ip/2".to_string(),
                image_url: None,
            },
        ]
    }

    fn config() -> EmailConfig {
        EmailConfig {
            user: "me@example.com".to_string(),
            password: "app-password".to_string(),
            recipient: "you@example.com".to_string(),
            smtp_host: "smtp.gmail.com".to_string(),
        }
    }

    #[test]
    fn subject_states_count() {
        let products = products();
        let digest = Digest {
            products: &products,
            query: "kids clothes",
            threshold: 2.0,
        };
        assert_eq!(
            digest.subject(),
            "\u{1F389} Found 2 Kids Clothes Deal(s) Under $2 at Walmart!"
        );
    }

    #[test]
    fn plain_text_lists_each_product() {
        let products = products();
        let digest = Digest {
            products: &products,
            query: "kids clothes",
            threshold: 2.0,
        };
        let text = digest.plain_text();
        assert!(text.starts_with("Walmart Kids Clothes Deals Found!\n\nFound 2 item(s) under $2:"));
        assert!(text.contains("2. Socks - $0.50\n   https://www.walmart.com/ip/2"));
    }

    #[test]
    fn html_escapes_and_only_renders_existing_images() {
        let products = products();
        let digest = Digest {
            products: &products,
            query: "kids clothes",
            threshold: 2.0,
        };
        let html = digest.html();
        assert!(html.contains("1. Tee &lt;Kids&gt; &amp; &quot;Co&quot;"));
        assert!(!html.contains("<Kids>"));
        assert_eq!(html.matches("<img ").count(), 1);
        assert!(html.contains("<strong>2</strong> item(s)"));
    }

    #[test]
    fn escape_html_covers_quotes() {
        assert_eq!(escape_html("a'b\"c"), "a&#039;b&quot;c");
    }

    #[test]
    fn builds_multipart_message() {
        let products = products();
        let digest = Digest {
            products: &products,
            query: "kids clothes",
            threshold: 2.0,
        };
        let message = EmailNotifier::new(config()).build_message(&digest).unwrap();
        assert_eq!(message.envelope().to()[0].to_string(), "you@example.com");
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn invalid_recipient_is_a_config_error() {
        let products = products();
        let digest = Digest {
            products: &products,
            query: "kids clothes",
            threshold: 2.0,
        };
        let notifier = EmailNotifier::new(EmailConfig {
            recipient: "not an address".to_string(),
            ..config()
        });
        assert!(matches!(
            notifier.build_message(&digest),
            Err(ScrapeError::Config(_))
        ));
    }
}
