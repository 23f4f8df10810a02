mod borough;
mod superborough;

pub use borough::{Borough, BOROUGH_SLOTS};
pub use superborough::{
    superborough_code, superborough_of, Superborough, SuperboroughPair, N_SUPERBOROUGHS,
    UNASSIGNED_CODE,
};
