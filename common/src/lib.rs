//! Inked Ghost-Writer Common Library
//!
//! CLIと永続化層で共有される、I/Oを持たない部分:
//! テンプレート・プロンプト組み立て・フォーム状態・セッション・APIの型

pub mod error;
pub mod form;
pub mod payload;
pub mod prompts;
pub mod session;
pub mod templates;
pub mod types;

pub use error::{Error, Result};
pub use form::{FormState, FormStore};
pub use payload::{build_payload, extract_output, Payload};
pub use session::{Action, GenerationTicket, Session};
pub use templates::{
    build_prompt, get_template, list_templates, missing_required, validate_required,
    BuiltPrompt, Category, FieldKind, FieldSpec, Prefill, Template, TemplateGroup, TemplateKind,
    EMPTY_FIELD_SENTINEL, TEMPLATES,
};
pub use types::{GenerationOutput, GenerationResult, Project, Tier, UserProfile};
