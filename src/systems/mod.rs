pub mod ability;
pub mod points;
pub mod shop;
pub mod upgrade;
pub mod wave;

pub use ability::{AbilityKind, AbilityStatus, AbilitySystem};
pub use points::{KillReward, PointsSystem};
pub use shop::{PurchaseError, ShopEffect, ShopOffer, ShopSystem};
pub use upgrade::{UpgradeOption, UpgradeSystem};
pub use wave::{WaveInfo, WaveSystem};
