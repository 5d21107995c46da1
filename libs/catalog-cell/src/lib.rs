// =====================================================================================
// CATALOG CELL - DEVICE & SIGNAL SOURCE REGISTRY
// =====================================================================================
//
// This cell is the device/entity catalog the watchdog coordinator queries:
// - Device identities and display names
// - Signal sources bound to each device, with their current values
// - A broadcast feed of signal value changes (the liveness event stream)
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod registry;
pub mod router;

pub use models::{CatalogError, DeviceCatalog, DeviceRecord, StateChange};
pub use registry::DeviceRegistry;
pub use router::create_catalog_router;
