//! Cleaning checklist form
//!
//! Platform-independent state and behavior behind the checklist page:
//! - [`form::ChecklistForm`] - Fields, personnel, signature and reset
//! - [`photos`] - Before/after photo slots and file validation
//! - [`camera`] - Camera session and frame capture
//! - [`theme`] - Persisted theme colors
//! - [`share`] - Share message, attachments, native/WhatsApp dispatch
//! - [`report`] - Printable report handed to an external renderer
//! - [`notice`] - Toast notices

pub mod camera;
pub mod error;
pub mod form;
pub mod notice;
pub mod photos;
pub mod report;
pub mod share;
pub mod theme;

pub use camera::{CameraSession, CameraState, MediaConstraints};
pub use error::{FormError, StoreError};
pub use form::ChecklistForm;
pub use notice::{messages, Notice, NoticeKind};
pub use photos::{PhotoSlot, PhotoStore};
pub use report::{Report, ReportRenderer};
pub use share::{Attachment, ShareOutcome, SharePayload, ShareTarget};
pub use theme::{CssVar, KeyValueStore, MemoryStore, ThemeKey};
