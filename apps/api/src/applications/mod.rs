// Job applications: multipart intake, resume upload, and the admin review surface.

pub mod handlers;
pub mod intake;
