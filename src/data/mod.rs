//! Data module - CSV and boundary loading, joins and filters

mod counties;
mod geometry;
mod loader;
mod normalize;
mod processor;

pub use counties::{canonical_name, COUNTY_COUNT};
pub use geometry::{CountyGeometry, GeometryError, GeometryLoader, DEFAULT_COUNTY_FIELD};
pub use loader::{
    IndicatorLoader, IndicatorRecord, IndicatorTable, LoaderError, COUNTY as COUNTY_COLUMN,
    DATE as DATE_COLUMN, INDICATOR as INDICATOR_COLUMN, VALUE as VALUE_COLUMN,
};
pub use normalize::{county_key, fold, title_case, CountyKey};
pub use processor::{
    CountyBreakdown, CountyValue, EngineError, FilteredView, IndicatorValue, JoinEngine,
    JoinedMapFrame, MapRow,
};
