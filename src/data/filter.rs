use std::collections::BTreeSet;

use super::model::{Attribute, CustomerRecord, Dataset};

// ---------------------------------------------------------------------------
// Filter predicate: which brands and regions are selected
// ---------------------------------------------------------------------------

/// Selected brands and regions.
///
/// A record passes when its brand AND its region are both selected.  An empty
/// set selects nothing, so start from [`FilterCriteria::all`] to show everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub brands: BTreeSet<String>,
    pub regions: BTreeSet<String>,
}

impl FilterCriteria {
    /// Every observed brand and region selected (i.e., no filtering).
    pub fn all(dataset: &Dataset) -> Self {
        FilterCriteria {
            brands: distinct_values(dataset, Attribute::Brand),
            regions: distinct_values(dataset, Attribute::Region),
        }
    }

    pub fn selected(&self, attribute: Attribute) -> &BTreeSet<String> {
        match attribute {
            Attribute::Brand => &self.brands,
            Attribute::Region => &self.regions,
        }
    }

    pub fn selected_mut(&mut self, attribute: Attribute) -> &mut BTreeSet<String> {
        match attribute {
            Attribute::Brand => &mut self.brands,
            Attribute::Region => &mut self.regions,
        }
    }

    pub fn matches(&self, record: &CustomerRecord) -> bool {
        self.brands.contains(&record.brand) && self.regions.contains(&record.region)
    }
}

/// Sorted set of the values observed for `attribute` in the unfiltered table.
pub fn distinct_values(dataset: &Dataset, attribute: Attribute) -> BTreeSet<String> {
    dataset.values(attribute).clone()
}

/// Return copies of the records that pass `criteria`, in dataset order.
pub fn filter(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<CustomerRecord> {
    dataset
        .records
        .iter()
        .filter(|rec| criteria.matches(rec))
        .cloned()
        .collect()
}
