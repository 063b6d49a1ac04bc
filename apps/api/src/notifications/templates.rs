//! Status email templates: a fixed branded HTML shell with a per-status body.

use chrono::{DateTime, NaiveDateTime};

/// Company branding interpolated into every email.
#[derive(Debug, Clone, PartialEq)]
pub struct Brand {
    pub company_name: String,
    pub website_url: String,
    pub careers_url: String,
}

impl Default for Brand {
    fn default() -> Self {
        Brand {
            company_name: "Lifewood".to_string(),
            website_url: "https://lifewood-ony.vercel.app/".to_string(),
            careers_url: "https://lifewood-ony.vercel.app/services.html".to_string(),
        }
    }
}

/// The application statuses that trigger an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailStatus {
    Received,
    Interview {
        start: Option<String>,
        end: Option<String>,
    },
    Rejected,
}

impl EmailStatus {
    /// Maps an admin-facing status label to a template. Unknown labels send nothing.
    pub fn from_label(label: &str, start: Option<String>, end: Option<String>) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "received" => Some(EmailStatus::Received),
            "interview" | "interview scheduled" => Some(EmailStatus::Interview { start, end }),
            "rejected" => Some(EmailStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

const PARAGRAPH_STYLE: &str = "margin:0;font-size:16px;line-height:1.7;color:#333333;";
const LEAD_PARAGRAPH_STYLE: &str =
    "margin:0 0 25px 0;font-size:16px;line-height:1.7;color:#333333;";

pub fn render(brand: &Brand, applicant_name: &str, position: &str, status: &EmailStatus) -> RenderedEmail {
    let company = escape_html(&brand.company_name);
    let position = escape_html(position);

    let (subject, header, body, button_link, button_text) = match status {
        EmailStatus::Received => (
            format!("Your {} Application Has Been Received", brand.company_name),
            "Application Received!".to_string(),
            format!(
                r#"<p style="{LEAD_PARAGRAPH_STYLE}">This is to confirm that we have successfully received your application for the <strong>{position}</strong> role at {company}.</p><p style="{PARAGRAPH_STYLE}">Our hiring team is now reviewing applications and will be in touch with the next steps as soon as possible. Thank you for your interest in joining our team!</p>"#
            ),
            brand.website_url.as_str(),
            "Visit Our Website",
        ),
        EmailStatus::Interview { start, end } => (
            format!("Interview Invitation from {}", brand.company_name),
            "You're Invited to Interview!".to_string(),
            format!(
                r#"<p style="{LEAD_PARAGRAPH_STYLE}">We were impressed by your application for the <strong>{position}</strong> role and would like to invite you to an interview with our team at {company}.</p><p style="{PARAGRAPH_STYLE}">{}</p>"#,
                schedule_sentence(start.as_deref(), end.as_deref())
            ),
            brand.website_url.as_str(),
            "Learn More About Us",
        ),
        EmailStatus::Rejected => (
            format!("An Update on Your Application with {}", brand.company_name),
            "Thank You For Your Interest".to_string(),
            format!(
                r#"<p style="{LEAD_PARAGRAPH_STYLE}">Thank you again for your interest in the <strong>{position}</strong> position and for taking the time to interview with our team at {company}.</p><p style="{PARAGRAPH_STYLE}">The selection process was exceptionally competitive, and after careful consideration, we have decided to move forward with another applicant. We will keep your application on file for future opportunities and wish you the very best in your job search.</p>"#
            ),
            brand.careers_url.as_str(),
            "Explore Other Roles",
        ),
    };

    let html = shell(brand, &header, &escape_html(applicant_name), &body, button_link, button_text);
    RenderedEmail { subject, html }
}

fn schedule_sentence(start: Option<&str>, end: Option<&str>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!(
            "Your interview is scheduled for <strong>{}</strong> until <strong>{}</strong>. Please reply to this email if you need to reschedule.",
            escape_html(&format_time(start)),
            escape_html(&format_time(end))
        ),
        (Some(start), None) => format!(
            "Your interview is scheduled for <strong>{}</strong>. Please reply to this email if you need to reschedule.",
            escape_html(&format_time(start))
        ),
        _ => "A member of our recruitment team will contact you shortly to arrange a suitable time.".to_string(),
    }
}

/// Renders an RFC 3339 or `YYYY-MM-DDTHH:MM[:SS]` timestamp for humans.
/// Anything else is passed through unchanged.
pub fn format_time(raw: &str) -> String {
    const HUMAN: &str = "%A, %B %-d, %Y at %-I:%M %p";
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return format!("{} (UTC{})", dt.format(HUMAN), dt.format("%:z"));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format(HUMAN).to_string();
        }
    }
    raw.to_string()
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn shell(
    brand: &Brand,
    header: &str,
    applicant_name: &str,
    body: &str,
    button_link: &str,
    button_text: &str,
) -> String {
    let company = escape_html(&brand.company_name);
    let wordmark = escape_html(&brand.company_name.to_lowercase());
    let website = escape_html(&brand.website_url);
    let button_link = escape_html(button_link);
    format!(
        r##"<!DOCTYPE html><html><head><meta charset="UTF-8"><style>@import url('https://fonts.googleapis.com/css2?family=Manrope:wght@400;700;800&display=swap');body{{font-family:'Manrope',Arial,sans-serif;}}</style></head><body style="margin:0;padding:0;background-color:#f5eedb;"><table border="0" cellpadding="0" cellspacing="0" width="100%"><tr><td style="padding:40px 20px;"><table align="center" border="0" cellpadding="0" cellspacing="0" width="600" style="border-collapse:collapse;background-color:#ffffff;border-radius:8px;box-shadow:0 4px 15px rgba(0,0,0,0.1);"><tr><td align="center" style="padding:30px 20px 20px 20px;"><a href="{website}" target="_blank" style="text-decoration:none;display:inline-block;"><svg width="24" height="32" viewBox="0 0 24 42" xmlns="http://www.w3.org/2000/svg" style="vertical-align:middle;margin-right:8px;height:32px;width:auto;"><path d="M12 0L23.5962 10.5V31.5L12 42L0.403847 31.5V10.5L12 0Z" fill="#FFB347"/></svg><span style="font-family:'Manrope',Arial,sans-serif;font-size:30px;font-weight:800;letter-spacing:-0.5px;color:#133020;vertical-align:middle;">{wordmark}</span></a></td></tr><tr><td style="padding:20px 40px;"><h1 style="font-size:28px;font-weight:700;color:#046241;margin:0 0 25px 0;text-align:center;">{header}</h1><p style="margin:0 0 15px 0;font-size:16px;line-height:1.7;color:#333333;">Dear {applicant_name},</p>{body}</td></tr><tr><td align="center" style="padding:10px 40px 30px 40px;"><a href="{button_link}" target="_blank" style="display:inline-block;padding:14px 35px;background-color:#FFB347;color:#133020;text-decoration:none;font-weight:700;border-radius:5px;font-size:16px;">{button_text}</a></td></tr><tr><td style="padding:0px 40px 40px 40px;"><p style="{PARAGRAPH_STYLE}">Sincerely,</p><p style="margin:5px 0 0 0;font-size:16px;line-height:1.7;color:#333333;">The {company} Recruitment Team</p></td></tr></table></td></tr></table></body></html>"##
    )
}
