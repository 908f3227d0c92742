use thiserror::Error;

/// Errors raised before or while allocating a chunk.
///
/// Generation itself is total over valid inputs, so every variant is raised
/// before the first cell is written.
#[derive(Error, Debug)]
pub enum GenError {
    #[error("chunk dimensions must be non-zero, got {height}x{width}x{depth}")]
    InvalidDimensions {
        height: usize,
        width: usize,
        depth: usize,
    },

    #[error("{requested} octaves requested, at most {max} supported")]
    TooManyOctaves { requested: u32, max: u32 },

    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("not a permutation of 0..=255: {duplicate} appears more than once")]
    InvalidPermutation { duplicate: u8 },

    #[error("could not allocate {cells} voxel cells")]
    Allocation { cells: u128 },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input: bad dimensions, octave count, parameters or table.
    InvalidConfiguration,
    /// The voxel buffer could not be reserved.
    Allocation,
    /// The config file could not be read or parsed.
    Config,
}

impl GenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenError::InvalidDimensions { .. }
            | GenError::TooManyOctaves { .. }
            | GenError::InvalidParameter { .. }
            | GenError::InvalidPermutation { .. } => ErrorKind::InvalidConfiguration,
            GenError::Allocation { .. } => ErrorKind::Allocation,
            GenError::ConfigParse(_) | GenError::Io(_) => ErrorKind::Config,
        }
    }
}
