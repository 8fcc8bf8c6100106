//! Printable report of a filled checklist
//!
//! Layout and PDF conversion belong to an external renderer; this module
//! only assembles what goes in it.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::FormError;
use crate::notice::{messages, Notice};

pub const REPORT_TITLE: &str = "Control de Limpieza";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub title: String,
    pub fecha: String,
    pub departamento: String,
    pub personnel: Vec<String>,
    /// Data URLs, absent when not provided
    pub before: Option<String>,
    pub after: Option<String>,
    pub signature: Option<String>,
}

impl Report {
    /// Suggested download name
    pub fn file_name(&self) -> String {
        let department: String = self
            .departamento
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        format!("control-limpieza-{}-{}.pdf", self.fecha.trim(), department)
    }

    pub fn to_json(&self) -> Result<String, FormError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Standalone printable HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
        html.push_str(&format!("<title>{}</title>", escape_html(&self.title)));
        html.push_str(
            "<style>body{font-family:sans-serif;margin:24px}\
             .photos{display:flex;gap:16px}.photos figure{flex:1;margin:0}\
             img{max-width:100%}.signature img{max-height:160px;border-bottom:1px solid #000}</style>",
        );
        html.push_str("</head><body>");
        html.push_str(&format!("<h1>{}</h1>", escape_html(&self.title)));
        html.push_str(&format!("<p><strong>Fecha:</strong> {}</p>", escape_html(&self.fecha)));
        html.push_str(&format!(
            "<p><strong>Departamento:</strong> {}</p>",
            escape_html(&self.departamento)
        ));

        if !self.personnel.is_empty() {
            html.push_str("<p><strong>Personal:</strong></p><ul>");
            for name in &self.personnel {
                html.push_str(&format!("<li>{}</li>", escape_html(name)));
            }
            html.push_str("</ul>");
        }

        if self.before.is_some() || self.after.is_some() {
            html.push_str("<div class=\"photos\">");
            for (label, image) in [("Antes", &self.before), ("Después", &self.after)] {
                if let Some(src) = image {
                    html.push_str(&format!(
                        "<figure><img src=\"{}\" alt=\"{label}\"><figcaption>{label}</figcaption></figure>",
                        escape_html(src)
                    ));
                }
            }
            html.push_str("</div>");
        }

        if let Some(src) = &self.signature {
            html.push_str(&format!(
                "<div class=\"signature\"><p><strong>Firma:</strong></p><img src=\"{}\" alt=\"Firma\"></div>",
                escape_html(src)
            ));
        }

        html.push_str("</body></html>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// External HTML-to-PDF renderer
#[allow(async_fn_in_trait)]
pub trait ReportRenderer {
    async fn render(&mut self, report: &Report) -> Result<(), FormError>;
}

/// Render `report`, reduced to the notice the user sees
pub async fn export_with_notice<R: ReportRenderer>(renderer: &mut R, report: &Report) -> Notice {
    match renderer.render(report).await {
        Ok(()) => {
            info!("Report rendered: {}", report.file_name());
            Notice::success(messages::REPORT_READY)
        }
        Err(e) => {
            warn!("Report rendering failed: {}", e);
            Notice::error(messages::REPORT_FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRenderer {
        fail: bool,
        rendered: Vec<String>,
    }

    impl ReportRenderer for FakeRenderer {
        async fn render(&mut self, report: &Report) -> Result<(), FormError> {
            if self.fail {
                return Err(FormError::Report("canvas tainted".to_string()));
            }
            self.rendered.push(report.file_name());
            Ok(())
        }
    }

    fn report() -> Report {
        Report {
            title: REPORT_TITLE.to_string(),
            fecha: "2024-05-01".to_string(),
            departamento: "Sala B".to_string(),
            personnel: vec!["Ana".to_string()],
            before: None,
            after: None,
            signature: Some("data:image/png;base64,AA==".to_string()),
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(report().file_name(), "control-limpieza-2024-05-01-sala-b.pdf");
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&report().to_json().unwrap()).unwrap();
        assert_eq!(json["title"], REPORT_TITLE);
        assert_eq!(json["departamento"], "Sala B");
        assert!(json["before"].is_null());
        assert_eq!(json["personnel"][0], "Ana");
    }

    #[test]
    fn test_html_escapes_user_text() {
        let mut report = report();
        report.departamento = "<script>alert(1)</script>".to_string();
        let html = report.to_html();
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<li>Ana</li>"));
        assert!(html.contains("alt=\"Firma\""));
        assert!(!html.contains("class=\"photos\""));
    }

    #[tokio::test]
    async fn test_export_notices() {
        let mut renderer = FakeRenderer {
            fail: false,
            rendered: Vec::new(),
        };
        let notice = export_with_notice(&mut renderer, &report()).await;
        assert_eq!(notice.message, messages::REPORT_READY);
        assert_eq!(renderer.rendered.len(), 1);

        renderer.fail = true;
        let notice = export_with_notice(&mut renderer, &report()).await;
        assert!(notice.is_error());
    }
}
