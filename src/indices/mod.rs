pub mod de_martonne;
pub mod pet;

pub use de_martonne::de_martonne;
pub use pet::{MonthlyTemperatures, PetFormula, Thornthwaite};
