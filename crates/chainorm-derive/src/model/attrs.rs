//! Attribute parsing for Model derive macro.
//!
//! Handles struct-level `#[orm(table = "...")]` and field-level `#[orm(skip)]`.

use syn::{Attribute, LitStr, Result};

#[derive(Default)]
pub(super) struct StructAttrs {
    pub table: Option<String>,
}

impl StructAttrs {
    pub(super) fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("orm")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    let value: LitStr = meta.value()?.parse()?;
                    if value.value().is_empty() {
                        return Err(meta.error("table name must not be empty"));
                    }
                    out.table = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported struct attribute, expected `table = \"...\"`"))
                }
            })?;
        }
        Ok(out)
    }
}

#[derive(Default)]
pub(super) struct FieldAttrs {
    pub skip: bool,
}

impl FieldAttrs {
    pub(super) fn parse(attrs: &[Attribute]) -> Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("orm")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    out.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported field attribute, expected `skip`"))
                }
            })?;
        }
        Ok(out)
    }
}
