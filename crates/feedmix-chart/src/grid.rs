use crate::ChartItem;

/// One integer production combination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Sum of unit_profit * quantity
    pub profit: f64,
    /// Sum of quantities
    pub total_amount: u64,
    /// Sum of resource_rate * quantity
    pub resource_used: f64,
}

/// Every integer combination of quantities between zero and each item's cap
#[derive(Debug, Clone)]
pub struct TradeOffGrid<'a> {
    items: &'a [ChartItem],
    limits: Vec<u64>,
}

impl<'a> TradeOffGrid<'a> {
    pub fn new(items: &'a [ChartItem]) -> Self {
        let limits = items.iter().map(ChartItem::upper_bound).collect();
        Self { items, limits }
    }

    /// Number of points, or None if it does not fit in a u64
    pub fn len(&self) -> Option<u64> {
        if self.limits.is_empty() {
            return Some(0);
        }
        self.limits
            .iter()
            .try_fold(1u64, |acc, &limit| acc.checked_mul(limit.checked_add(1)?))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn points(&self) -> GridPoints<'_> {
        GridPoints {
            items: self.items,
            limits: &self.limits,
            current: vec![0; self.limits.len()],
            done: self.limits.is_empty(),
        }
    }
}

/// Odometer iteration over the grid, first item varying fastest
pub struct GridPoints<'a> {
    items: &'a [ChartItem],
    limits: &'a [u64],
    current: Vec<u64>,
    done: bool,
}

impl Iterator for GridPoints<'_> {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        if self.done {
            return None;
        }

        let mut point = GridPoint {
            profit: 0.0,
            total_amount: 0,
            resource_used: 0.0,
        };
        for (item, &q) in self.items.iter().zip(&self.current) {
            point.profit += item.unit_profit * q as f64;
            point.total_amount += q;
            point.resource_used += item.resource_rate * q as f64;
        }

        // Advance
        self.done = true;
        for (digit, &limit) in self.current.iter_mut().zip(self.limits) {
            if *digit < limit {
                *digit += 1;
                self.done = false;
                break;
            }
            *digit = 0;
        }

        Some(point)
    }
}
