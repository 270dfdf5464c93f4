//! Crops planted on farms

use serde::{Deserialize, Serialize};

use core_kernel::CropId;

/// Crops available on a fresh installation
pub const INITIAL_CROPS: [&str; 5] = ["Soja", "Milho", "Algodão", "Café", "Cana de Açúcar"];

/// A crop, unique by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub id: CropId,
    pub name: String,
}
