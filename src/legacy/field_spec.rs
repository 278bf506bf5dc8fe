//! Column-positioned field extraction.
//!
//! Each legacy report format defines a table of [`FieldSpec`]s naming the
//! column offset and width of every field. New report types add a table;
//! the parsing state machine and numeric conventions are shared.

/// The width of a fixed-position field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    /// A fixed number of characters.
    Fixed(usize),
    /// Everything from the start offset to the end of the line.
    ToEnd,
}

/// One column-positioned field in a legacy report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field name, used for diagnostics.
    pub name: &'static str,
    /// The zero-based start column.
    pub start: usize,
    /// The field width.
    pub width: FieldWidth,
}

impl FieldSpec {
    /// Creates a fixed-width field spec.
    pub const fn fixed(name: &'static str, start: usize, width: usize) -> Self {
        Self {
            name,
            start,
            width: FieldWidth::Fixed(width),
        }
    }

    /// Creates a field spec running to the end of the line.
    pub const fn to_end(name: &'static str, start: usize) -> Self {
        Self {
            name,
            start,
            width: FieldWidth::ToEnd,
        }
    }

    /// Extracts this field's raw text from a report line.
    ///
    /// Lines shorter than the field's extent yield the available portion;
    /// a line ending before the start offset yields the empty string. The
    /// caller trims and interprets the slice.
    ///
    /// # Example
    ///
    /// ```
    /// use vesting_engine::legacy::FieldSpec;
    ///
    /// let spec = FieldSpec::fixed("name", 5, 5);
    /// assert_eq!(spec.extract("0001 SMITH 42"), "SMITH");
    /// assert_eq!(spec.extract("0001"), "");
    /// ```
    pub fn extract<'a>(&self, line: &'a str) -> &'a str {
        if self.start >= line.len() {
            return "";
        }
        match self.width {
            FieldWidth::Fixed(width) => {
                let end = (self.start + width).min(line.len());
                &line[self.start..end]
            }
            FieldWidth::ToEnd => &line[self.start..],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fixed_field() {
        let spec = FieldSpec::fixed("badge", 0, 6);
        assert_eq!(spec.extract("703917REMAINDER"), "703917");
    }

    #[test]
    fn test_extract_clamps_to_line_length() {
        let spec = FieldSpec::fixed("amount", 10, 13);
        assert_eq!(spec.extract("0123456789ABC"), "ABC");
    }

    #[test]
    fn test_extract_past_end_is_empty() {
        let spec = FieldSpec::fixed("amount", 50, 13);
        assert_eq!(spec.extract("short line"), "");
    }

    #[test]
    fn test_extract_to_end() {
        let spec = FieldSpec::to_end("tokens", 6);
        assert_eq!(spec.extract("703917 1543 100 64 2"), " 1543 100 64 2");
    }
}
