use std::collections::HashMap;

use crate::domain::{
    AggregationResult, CategoryBreakdown, CategoryLabel, CellValue, CrossTabEntry, CrossTabResult,
    GroupCount, Table,
};
use crate::error::SchemaError;

/// Counts, for every category in `categories`, the records carrying that
/// category grouped by `group_column`.
///
/// The output follows the order of `categories`. A category matched by no
/// record yields [`CategoryBreakdown::NoData`]. Matching is exact and
/// case-sensitive; a `Missing` category cell never matches a label.
pub fn count_by_category(
    table: &Table,
    categories: &[CategoryLabel],
    category_column: &str,
    group_column: &str,
) -> Result<Vec<(CategoryLabel, CategoryBreakdown)>, SchemaError> {
    let category_idx = table.column_index(category_column)?;
    let group_idx = table.column_index(group_column)?;

    let breakdowns = categories
        .iter()
        .map(|category| {
            let keys = table
                .records()
                .iter()
                .filter(|record| record.get(category_idx).as_str() == Some(category.as_str()))
                .map(|record| record.get(group_idx));

            let counts = count_groups(keys);
            let breakdown = if counts.is_empty() {
                CategoryBreakdown::NoData
            } else {
                CategoryBreakdown::Counts(counts)
            };
            (category.clone(), breakdown)
        })
        .collect();

    Ok(breakdowns)
}

/// Counts records per (group, category) pair over the whole table.
///
/// Groups appear in first-seen order, and categories in first-seen order
/// within each group. `Missing` is an ordinary key, so the counts always add
/// up to the number of records.
pub fn cross_tabulate(
    table: &Table,
    group_column: &str,
    category_column: &str,
) -> Result<CrossTabResult, SchemaError> {
    let group_idx = table.column_index(group_column)?;
    let category_idx = table.column_index(category_column)?;

    let mut groups: Vec<(&CellValue, Vec<(&CellValue, usize)>)> = Vec::new();
    let mut group_positions: HashMap<&CellValue, usize> = HashMap::new();
    let mut pair_positions: HashMap<(&CellValue, &CellValue), usize> = HashMap::new();

    for record in table.records() {
        let group = record.get(group_idx);
        let category = record.get(category_idx);

        let group_pos = *group_positions.entry(group).or_insert_with(|| {
            groups.push((group, Vec::new()));
            groups.len() - 1
        });
        let categories = &mut groups[group_pos].1;

        match pair_positions.get(&(group, category)) {
            Some(&pos) => categories[pos].1 += 1,
            None => {
                pair_positions.insert((group, category), categories.len());
                categories.push((category, 1));
            }
        }
    }

    Ok(groups
        .into_iter()
        .flat_map(|(group, categories)| {
            categories.into_iter().map(move |(category, count)| CrossTabEntry {
                group: group.clone(),
                category: category.clone(),
                count,
            })
        })
        .collect())
}

fn count_groups<'a>(keys: impl Iterator<Item = &'a CellValue>) -> AggregationResult {
    let mut positions: HashMap<&CellValue, usize> = HashMap::new();
    let mut counts: AggregationResult = Vec::new();

    for key in keys {
        match positions.get(key) {
            Some(&pos) => counts[pos].count += 1,
            None => {
                positions.insert(key, counts.len());
                counts.push(GroupCount {
                    key: key.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable: equal counts keep first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
