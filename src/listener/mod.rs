//! Local HTTP endpoint that catches subscription notifications.
//!
//! The CSE POSTs to the registered `nu` URL; the listener parses the body
//! and forwards it into a channel owned by the probe that is waiting.

pub mod web;

pub use web::NotificationListener;

#[cfg(test)]
mod test_web;
