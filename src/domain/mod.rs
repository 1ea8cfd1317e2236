pub mod entities;
pub mod value_objects;

pub use entities::{Application, Assessment, FieldPatch, Interview, PreparationSession, Record};
pub use value_objects::{QueryKey, RecordId, RollbackToken, UserId};
