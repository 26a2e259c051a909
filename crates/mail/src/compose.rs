//! Deterministic HTML email composition. Same input, byte-identical
//! output; no I/O.

use serde::{Deserialize, Serialize};

use lf_domain::config::BrandingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    Questionnaire,
    Quotation,
    #[serde(alias = "follow-up", alias = "followup")]
    #[serde(rename = "follow-up")]
    FollowUp,
    #[default]
    General,
    Template,
}

impl EmailType {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "questionnaire" => Self::Questionnaire,
            "quotation" => Self::Quotation,
            "follow-up" | "followup" => Self::FollowUp,
            "template" => Self::Template,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Questionnaire => "questionnaire",
            Self::Quotation => "quotation",
            Self::FollowUp => "follow-up",
            Self::General => "general",
            Self::Template => "template",
        }
    }

    fn accent_color(&self) -> &'static str {
        match self {
            Self::Questionnaire => "#3B82F6",
            Self::Quotation => "#10B981",
            Self::FollowUp => "#F59E0B",
            Self::General | Self::Template => "#6B7280",
        }
    }

    fn subject(&self, company_name: &str, brand: &str) -> String {
        let company = |fallback: &str| {
            if company_name.is_empty() {
                fallback.to_string()
            } else {
                company_name.to_string()
            }
        };
        match self {
            Self::Questionnaire => {
                format!("📋 Business Questionnaire - {}", company("Your Business Growth"))
            }
            Self::Quotation => {
                format!("💰 Your Business Growth Quote - {}", company("Tailored Solutions"))
            }
            Self::FollowUp => {
                format!("🔄 Following Up - {}", company("Your Business Growth Journey"))
            }
            Self::General | Self::Template => {
                format!("📧 Message from {brand} - {}", company("Business Growth Solutions"))
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComposeData {
    pub recipient_name: String,
    pub company_name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub subject: String,
    pub html_body: String,
}

/// Build the themed HTML email for a plain-text body.
pub fn compose(ty: EmailType, data: &ComposeData, branding: &BrandingConfig) -> ComposedEmail {
    let subject = ty.subject(&data.company_name, &branding.company_name);
    let content = format_content(&data.body);
    let html_body = shell(&content, ty.accent_color(), branding);
    ComposedEmail { subject, html_body }
}

fn shell(content: &str, color: &str, branding: &BrandingConfig) -> String {
    let contacts: Vec<&str> = [
        branding.contact_email.as_deref(),
        branding.contact_phone.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect();
    let contact_line = if contacts.is_empty() {
        String::new()
    } else {
        format!(
            "\n            <p style=\"margin: 8px 0 0;\">{}</p>",
            contacts.join(" | ")
        )
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Email from {brand}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            line-height: 1.6;
            color: #333333;
            max-width: 600px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f8fafc;
        }}
        .email-container {{
            background-color: #ffffff;
            border-radius: 12px;
            box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1);
            overflow: hidden;
        }}
        .email-body {{
            padding: 32px;
        }}
        .email-content {{
            font-size: 16px;
            line-height: 1.7;
            margin-bottom: 24px;
        }}
        .email-content p {{
            margin-bottom: 16px;
        }}
        .email-content strong {{
            color: {color};
            font-weight: 600;
        }}
        .email-content ul {{
            padding-left: 20px;
            margin-bottom: 16px;
        }}
        .email-content li {{
            margin-bottom: 8px;
        }}
        .footer {{
            background-color: #f9fafb;
            padding: 20px;
            text-align: center;
            color: #6b7280;
            font-size: 14px;
            border-top: 1px solid #e5e7eb;
        }}
    </style>
</head>
<body>
    <div class="email-container">
        <div class="email-body">
            <div class="email-content">
                {content}
            </div>
        </div>
        <div class="footer">
            <p style="margin: 0;">This email was sent from {brand} CRM System</p>{contact_line}
        </div>
    </div>
</body>
</html>"#,
        brand = branding.company_name,
    )
}

/// Paragraphs on blank lines; `- ` runs become bullet lists with the
/// leading text kept as an introductory paragraph.
fn format_content(body: &str) -> String {
    body.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|paragraph| {
            if paragraph.contains("- ") {
                let items: Vec<&str> = paragraph
                    .split("- ")
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                if items.len() > 1 {
                    let intro = format!("<p>{}</p>", format_inline(items[0]));
                    let list: String = items[1..]
                        .iter()
                        .map(|item| format!("<li>{}</li>", format_inline(item)))
                        .collect();
                    return format!("{intro}<ul>{list}</ul>");
                }
            }
            format!("<p>{}</p>", format_inline(paragraph))
        })
        .collect()
}

fn format_inline(text: &str) -> String {
    let bold = regex::Regex::new(r"\*\*([^*]+)\*\*");
    let quoted = regex::Regex::new(r#""([^"]+)""#);
    let email = regex::Regex::new(r"([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})");
    let phone = regex::Regex::new(r"(\+?[\d][\d\s\-()]{9,})");

    let mut out = text.to_string();
    if let Ok(re) = bold {
        out = re.replace_all(&out, "<strong>$1</strong>").into_owned();
    }
    if let Ok(re) = quoted {
        out = re
            .replace_all(&out, "<strong>\"$1\"</strong>")
            .into_owned();
    }
    if let Ok(re) = email {
        out = re
            .replace_all(&out, r##"<a href="mailto:$1" style="color: #3B82F6;">$1</a>"##)
            .into_owned();
    }
    if let Ok(re) = phone {
        out = re
            .replace_all(&out, r##"<a href="tel:$1" style="color: #3B82F6;">$1</a>"##)
            .into_owned();
    }
    out.replace('\n', "<br>")
}

/// Strip HTML down to a plain-text fallback for transports that want
/// both bodies.
pub fn plain_text(body: &str) -> String {
    let br = regex::Regex::new(r"(?i)<br\s*/?>");
    let close_p = regex::Regex::new(r"(?i)</p>");
    let open_p = regex::Regex::new(r"(?i)<p[^>]*>");
    let any_tag = regex::Regex::new(r"<[^>]*>");
    let blank_runs = regex::Regex::new(r"\n\s*\n\s*\n");

    let mut out = body.to_string();
    if let Ok(re) = br {
        out = re.replace_all(&out, "\n").into_owned();
    }
    if let Ok(re) = close_p {
        out = re.replace_all(&out, "\n\n").into_owned();
    }
    if let Ok(re) = open_p {
        out = re.replace_all(&out, "").into_owned();
    }
    if let Ok(re) = any_tag {
        out = re.replace_all(&out, "").into_owned();
    }
    out = out
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");
    if let Ok(re) = blank_runs {
        out = re.replace_all(&out, "\n\n").into_owned();
    }
    out.trim().to_string()
}
