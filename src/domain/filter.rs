/// Alternation matching any of `values`. Each value is a regular expression
/// in its own right; list filters match when one of them does.
#[must_use]
pub fn any_pattern(values: &[String]) -> String {
    format!("(?:{})", values.join("|"))
}

/// Predicates over a referenced set or rarity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RefFilter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub alias: Option<String>,
}

impl RefFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.alias.is_none()
    }

    #[must_use]
    fn normalized(self) -> Option<Self> {
        let filter = Self {
            id: non_blank(self.id),
            name: non_blank(self.name),
            alias: non_blank(self.alias),
        };
        (!filter.is_empty()).then_some(filter)
    }
}

/// Conjunction of optional card predicates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardFilter {
    pub name: Option<String>,
    pub types: Option<Vec<String>>,
    pub costs: Option<Vec<String>>,
    pub number_cost: Option<f64>,
    pub set: Option<RefFilter>,
    pub rarity: Option<RefFilter>,
}

impl CardFilter {
    /// Drops blank strings, empty lists and empty nested filters.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            name: non_blank(self.name),
            types: non_empty(self.types),
            costs: non_empty(self.costs),
            number_cost: self.number_cost,
            set: self.set.and_then(RefFilter::normalized),
            rarity: self.rarity.and_then(RefFilter::normalized),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.types.is_none()
            && self.costs.is_none()
            && self.number_cost.is_none()
            && self.set.is_none()
            && self.rarity.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetFilter {
    pub name: Option<String>,
    pub alias: Option<String>,
}

impl SetFilter {
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            name: non_blank(self.name),
            alias: non_blank(self.alias),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.alias.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn non_empty(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values
        .map(|values| {
            values
                .into_iter()
                .filter_map(|value| non_blank(Some(value)))
                .collect::<Vec<_>>()
        })
        .filter(|values| !values.is_empty())
}
