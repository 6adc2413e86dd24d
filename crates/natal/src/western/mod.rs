pub mod lots;
pub mod rulers;

pub use lots::{lot_of_fortune, lot_of_spirit, sect_of, LotFormula, Sect};
pub use rulers::{ruled_signs, sign_ruler};
