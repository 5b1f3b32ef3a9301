pub mod config;
pub mod deferred;
pub mod editor;
pub mod error;
pub mod format;
pub mod hit;
pub mod history;
pub mod input;
pub mod manipulate;
pub mod notices;
pub mod pages;
pub mod registry;
pub mod shortcuts;
pub mod surface;
pub mod table;

pub use config::{Clock, EditorConfig, system_clock};
pub use editor::{Editor, ImageFile};
pub use error::{EditorError, InteractionError};
pub use format::{Alignment, CaretContext, FormatCommand, FormatState, RichText};
pub use history::{History, Snapshot};
pub use input::{InputEvent, Modifiers};
pub use manipulate::{InteractionMode, Update};
pub use notices::{Notice, Severity};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use table::{ColumnPosition, RowPosition};
