//! Plain-text table rendering for the record store.

use raidtracker_core::{ParticipantRecord, Tier, TierMarks, CATALOG};

const NAME_HEADER: &str = "Name";
const SCORE_HEADER: &str = "Gear Score";
const MARKED: &str = "x";
const UNMARKED: &str = ".";

/// Renders one row per participant with a 10/25 column pair per raid.
///
/// Rows are numbered from 1 in insertion order.
pub fn render_table(records: &[ParticipantRecord]) -> String {
    if records.is_empty() {
        return "No characters yet. Add one with `raidtracker add <NAME>`.".to_string();
    }

    let row_width = records.len().to_string().len();
    let name_width = column_width(NAME_HEADER, records.iter().map(|r| r.name.as_str()));
    let score_width = column_width(SCORE_HEADER, records.iter().map(|r| r.gear_score.as_str()));
    let tier_header = Tier::ALL.map(Tier::as_str).join(" ");
    let group_widths = CATALOG
        .iter()
        .map(|activity| activity.label.len().max(tier_header.len()))
        .collect::<Vec<_>>();

    let lead = |row: &str, name: &str, score: &str| {
        format!("{row:>row_width$}  {name:<name_width$}  {score:<score_width$}")
    };

    let mut lines = Vec::with_capacity(records.len() + 2);
    lines.push(join_groups(
        lead("#", NAME_HEADER, SCORE_HEADER),
        CATALOG.iter().map(|activity| activity.label.to_string()),
        &group_widths,
    ));
    lines.push(join_groups(
        lead("", "", ""),
        CATALOG.iter().map(|_| tier_header.clone()),
        &group_widths,
    ));
    for (position, record) in records.iter().enumerate() {
        lines.push(join_groups(
            lead(
                &(position + 1).to_string(),
                &record.name,
                &record.gear_score,
            ),
            record.completion.iter().map(|(_, marks)| mark_cells(marks)),
            &group_widths,
        ));
    }

    lines
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|value| value.chars().count())
        .chain([header.len()])
        .max()
        .unwrap_or(0)
}

fn join_groups(
    lead: String,
    groups: impl Iterator<Item = String>,
    widths: &[usize],
) -> String {
    let mut line = lead;
    for (group, &width) in groups.zip(widths) {
        line.push_str(&format!(" | {group:<width$}"));
    }
    line
}

fn mark_cells(marks: TierMarks) -> String {
    Tier::ALL
        .iter()
        .map(|tier| {
            let mark = if marks.get(*tier) { MARKED } else { UNMARKED };
            format!("{mark:<width$}", width = tier.as_str().len())
        })
        .collect::<Vec<_>>()
        .join(" ")
}
