pub mod config;
pub mod error;
pub mod types;

pub use config::{EyesightSection, GridSection, GridSettings, ShardSettings};
pub use error::{ConfigError, Result};
pub use types::{
    AreaPoint, CellPoint, EntityId, RectPoint, RegionPoint, INVALID_AREA, INVALID_CELL,
    INVALID_COORD, INVALID_REGION,
};
