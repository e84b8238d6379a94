//! Web Weaver engine
//!
//! Turns natural-language prompts into runnable web code through a text model,
//! lets the user refine that code with further prompts, and keeps named
//! snapshots of it in a local key/value store.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use weaver_engine::{
//!     FileStorage, GatewayCodeModel, NullNotificationSink, ProjectStore, Session, Variant,
//! };
//!
//! let model = GatewayCodeModel::new(gateway, "gpt-4o-mini");
//! let store = ProjectStore::new(Box::new(FileStorage::new(data_dir)));
//! let mut session = Session::new(Variant::MultiFile, store, Arc::new(NullNotificationSink));
//! session.load_projects()?;
//!
//! session.set_prompt("A landing page for a coffee shop");
//! session.generate(&model).await?;
//! ```

pub mod bundle;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod export;
pub mod flows;
pub mod markers;
pub mod parser;
pub mod preview;
pub mod prompt;
pub mod session;
pub mod storage;
pub mod store;

// Re-exports for convenience
pub use bundle::{CodeBundle, ComponentCode, MultiFileCode, Section, Variant};
pub use config::{default_data_dir, AppConfig, ConfigError, ModelConfig};
pub use error::{Result, WeaverError};
pub use events::{
    Notification, NotificationLevel, NotificationSink, NullNotificationSink, VecNotificationSink,
};
pub use export::{archive_file_name, write_archive, write_section, ExportFile};
pub use flows::{
    CodeModel, EditCodeOutput, EditCodeRequest, EditComponentOutput, EditComponentRequest,
    FlowError, GatewayCodeModel, GenerateCodeOutput, GenerateComponentOutput, GenerateRequest,
};
pub use parser::{parse_edit_response, parse_sections, ParseError};
pub use preview::{compose_document, write_preview, Viewport, SANDBOX_PERMISSIONS};
pub use session::{Invocation, ModelReply, ModelRequest, NamePrompt, Session};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{Project, ProjectStore, StoreError};
