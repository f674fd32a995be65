//! Plugins for enhancing the default implementation of mathscan can be
//! defined in this module.

pub mod markup;
