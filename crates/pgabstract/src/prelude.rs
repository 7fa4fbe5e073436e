//! Common imports.
//!
//! ```
//! use pgabstract::prelude::*;
//! ```

pub use crate::base::TableRef;
pub use crate::bind::{Bind, BindValue};
pub use crate::config::{Config, KeywordCase};
pub use crate::error::{SqlError, SqlResult};
pub use crate::fragment::BuiltQuery;
pub use crate::pg::{
    ConflictSpec, InsertOptions, JoinKind, JoinSpec, PgAbstract, SelectOptions, SelectTail,
    Source,
};
pub use crate::value::ValueNode;
