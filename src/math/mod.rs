pub mod constant_product;
pub mod full_math;
pub mod scalar;
pub mod sqrt_price_math;
pub mod swap_step;
pub mod tick_math;
