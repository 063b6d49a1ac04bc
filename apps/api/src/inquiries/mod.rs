// General contact-form inquiries.

pub mod handlers;
