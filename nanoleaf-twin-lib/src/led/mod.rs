pub mod anim;
pub mod color;
