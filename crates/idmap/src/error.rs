use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IdMapError {
    #[error("id {id} has no entry in the mapping table")]
    Unmapped { id: u32 },
}

pub type Result<T, E = IdMapError> = std::result::Result<T, E>;
