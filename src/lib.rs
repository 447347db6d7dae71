//! Print-ready label documents composited onto fixed template backgrounds.
//!
//! Text fields are fitted with [`layout::fit_text`] or anchored above a printed rule with
//! [`layout::fit_above_line`], drawn through the [`canvas`] compositor, and serialized as PDF by
//! the per-family builders in [`labels`].  Fonts, backgrounds and geometry are loaded once into
//! [`assets::Resources`] and shared read-only by every build.

pub mod assets;
pub mod batch;
pub mod canvas;
pub mod fonts;
pub mod labels;
pub mod layout;
pub mod qr;
pub mod records;
pub mod text;

pub use assets::{AssetError, AssetPaths, Resources};
pub use canvas::RenderError;
pub use records::{DomainRecord, ProductRecord, TeaRecord, TipsRecord, ValidationError};
