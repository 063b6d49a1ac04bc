// Open positions shown on the public careers page.

pub mod handlers;
