use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Column contract
// ---------------------------------------------------------------------------

/// Header names the source file must carry.  Mixed casing and spacing are
/// part of the file format shared with existing data files.
pub const BRAND_COLUMN: &str = "Brand";
pub const REGION_COLUMN: &str = "region";
pub const CUSTOMER_NAME_COLUMN: &str = "Cust Name";
pub const SALE_VALUE_COLUMN: &str = "Sale value";

/// All required columns, in the order they are checked.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    BRAND_COLUMN,
    REGION_COLUMN,
    CUSTOMER_NAME_COLUMN,
    SALE_VALUE_COLUMN,
];

/// Header of the derived decile column.  Never read back from a source.
pub const DECILE_COLUMN: &str = "Decile";

// ---------------------------------------------------------------------------
// Attribute – the two categorical columns a user can filter on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Brand,
    Region,
}

impl Attribute {
    pub const ALL: [Attribute; 2] = [Attribute::Brand, Attribute::Region];

    /// Source column backing this attribute.
    pub fn column_name(self) -> &'static str {
        match self {
            Attribute::Brand => BRAND_COLUMN,
            Attribute::Region => REGION_COLUMN,
        }
    }

    /// Label used by the filter widgets.
    pub fn label(self) -> &'static str {
        match self {
            Attribute::Brand => "Brand",
            Attribute::Region => "Region",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CustomerRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single customer row.
///
/// Columns outside the required four are kept verbatim in `extras` as
/// `(column name, raw text)` pairs, in source order, so they survive export.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub brand: String,
    pub region: String,
    pub customer_name: String,
    pub sale_value: f64,
    pub extras: Vec<(Arc<str>, String)>,
}

impl CustomerRecord {
    /// Record with no pass-through columns.
    pub fn new(
        brand: impl Into<String>,
        region: impl Into<String>,
        customer_name: impl Into<String>,
        sale_value: f64,
    ) -> Self {
        Self {
            brand: brand.into(),
            region: region.into(),
            customer_name: customer_name.into(),
            sale_value,
            extras: Vec::new(),
        }
    }

    /// Value of a categorical attribute.
    pub fn attribute(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Brand => &self.brand,
            Attribute::Region => &self.region,
        }
    }

    /// Text of any column by header name, formatted the way it is exported.
    pub fn cell(&self, column: &str) -> Option<String> {
        match column {
            BRAND_COLUMN => Some(self.brand.clone()),
            REGION_COLUMN => Some(self.region.clone()),
            CUSTOMER_NAME_COLUMN => Some(self.customer_name.clone()),
            SALE_VALUE_COLUMN => Some(self.sale_value.to_string()),
            other => self
                .extras
                .iter()
                .find(|(name, _)| &**name == other)
                .map(|(_, value)| value.clone()),
        }
    }

    /// Text of every column in `columns` order.
    ///
    /// The first occurrence of each required header maps to its field; every
    /// other header, repeated names included, takes the next pass-through
    /// value in turn.
    pub fn cells(&self, columns: &[String]) -> Vec<String> {
        let mut seen = [false; REQUIRED_COLUMNS.len()];
        let mut extras = self.extras.iter();
        columns
            .iter()
            .map(|col| {
                let required = REQUIRED_COLUMNS.iter().position(|c| *c == col.as_str());
                match required {
                    Some(i) if !seen[i] => {
                        seen[i] = true;
                        self.cell(col).unwrap_or_default()
                    }
                    _ => extras
                        .next()
                        .map(|(_, value)| value.clone())
                        .unwrap_or_default(),
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The immutable loaded table with pre-computed distinct values.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// All records, in source order.
    pub records: Vec<CustomerRecord>,
    /// Header names in source order (required and pass-through columns).
    pub columns: Vec<String>,
    /// Sorted distinct brands.
    pub brands: BTreeSet<String>,
    /// Sorted distinct regions.
    pub regions: BTreeSet<String>,
}

impl Dataset {
    /// Build the distinct-value indices from the loaded records.
    pub fn from_records(columns: Vec<String>, records: Vec<CustomerRecord>) -> Self {
        let brands = records.iter().map(|r| r.brand.clone()).collect();
        let regions = records.iter().map(|r| r.region.clone()).collect();
        Dataset {
            records,
            columns,
            brands,
            regions,
        }
    }

    /// Distinct values observed for `attribute` across the whole table.
    pub fn values(&self, attribute: Attribute) -> &BTreeSet<String> {
        match attribute {
            Attribute::Brand => &self.brands,
            Attribute::Region => &self.regions,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
