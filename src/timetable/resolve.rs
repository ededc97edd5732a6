use tracing::trace;

use super::model::{ElementType, MergedPeriod, Period, ReferenceTables, ResolvedElements};

/// Replaces the element references of each period by the names found in
/// the matching reference table.
///
/// Ids missing from their table are skipped, so a period can end up with
/// fewer names than it had elements.
pub fn resolve_references(periods: Vec<Period>, tables: &ReferenceTables) -> Vec<MergedPeriod> {
    periods
        .into_iter()
        .map(|mut period| {
            let elements = std::mem::take(&mut period.elements);
            let mut resolved = ResolvedElements::default();

            for element in &elements {
                let (table, names) = match &element.kind {
                    ElementType::Class => (&tables.classes, &mut resolved.classes),
                    ElementType::Teacher => (&tables.teachers, &mut resolved.teachers),
                    ElementType::Subject => (&tables.subjects, &mut resolved.subjects),
                    ElementType::Room => (&tables.rooms, &mut resolved.rooms),
                    ElementType::Other(_) => continue,
                };

                let before = names.len();
                names.extend(
                    table
                        .iter()
                        .filter(|entry| entry.id == element.id)
                        .map(|entry| entry.name.clone()),
                );
                if names.len() == before {
                    trace!(kind = ?element.kind, id = element.id, "No reference entry for element");
                }
            }

            period.into_resolved(resolved)
        })
        .collect()
}
