use bson::{Bson, Document};
use tracing::warn;

use crate::sort::Order;

/// Normalizes requested find/delete options into the store's option document.
///
/// Sort keys merge, lowest priority first: the declared order, the `order`
/// option, the `sort` option. Directions become `1` / `-1`. A configured
/// limit applies when none is requested, and a configured page beyond the
/// first derives `skip` from the effective limit. A `skip` that would overflow
/// is left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsTranslator {
    pub order: Option<Order>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl OptionsTranslator {
    pub fn translate(&self, requested: Document) -> Document {
        let mut options = requested;
        self.translate_sort(&mut options);
        self.translate_limit(&mut options);
        options
    }

    fn translate_sort(&self, options: &mut Document) {
        let requested_order = options.remove("order");
        let requested_sort = options.remove("sort");

        if self.order.is_none() && requested_order.is_none() && requested_sort.is_none() {
            return;
        }

        let mut merged = requested_sort
            .as_ref()
            .map(Order::from_bson)
            .unwrap_or_default();
        if let Some(order) = &requested_order {
            merged.union(&Order::from_bson(order));
        }
        if let Some(order) = &self.order {
            merged.union(order);
        }

        options.insert("sort", merged.to_document());
    }

    fn translate_limit(&self, options: &mut Document) {
        if let Some(limit) = self.limit.filter(|l| *l != 0) {
            if !options.contains_key("limit") {
                options.insert("limit", limit);
            }
        }

        let Some(page) = self.page.filter(|p| *p > 1) else {
            return;
        };
        if options.contains_key("skip") {
            return;
        }
        let Some(limit) = options.get("limit").and_then(as_integer).filter(|l| *l != 0) else {
            return;
        };
        // An offset past i64 cannot address any document; leave skip unset.
        match limit.checked_mul(page - 1) {
            Some(skip) => {
                options.insert("skip", skip);
            }
            None => warn!(limit, page, "skip overflows i64, not applied"),
        }
    }
}

fn as_integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.fract() == 0.0 => Some(*v as i64),
        _ => None,
    }
}
