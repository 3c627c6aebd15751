//! Frame construction from metric series and command output

use crate::models::{Field, Frame, FrameMeta};
use crate::response::{BackendResponse, CommandResult, GroupKind, MetricSeries, Payload};

use super::resources::ResourceIndex;

pub const COMMAND_FRAME_NAME: &str = "linux_cmd";

/// Value of the first group-info of `group`, or `""` when there is none
pub fn extract_group_value(series: &MetricSeries, group: GroupKind) -> &str {
    series
        .group_infos
        .iter()
        .find(|info| info.group == group)
        .map(|info| info.value.as_str())
        .unwrap_or("")
}

/// `TAG` group-infos as sorted `"name: value"` pairs joined by `", "`
pub fn render_tags(series: &MetricSeries) -> String {
    let mut tags: Vec<String> = series
        .group_infos
        .iter()
        .filter(|info| info.group == GroupKind::Tag)
        .map(|info| format!("{}: {}", info.name, info.value))
        .collect();
    tags.sort();
    tags.join(", ")
}

/// One frame per series, named `"<metric>: <resource>[ { <tags> }]"`
pub fn build_frame(
    series: &MetricSeries,
    ref_id: &str,
    statement: &str,
    index: &ResourceIndex,
) -> Frame {
    let metric = extract_group_value(series, GroupKind::Metric);
    let resource_id = extract_group_value(series, GroupKind::Resource);

    let mut name = format!("{}: {}", metric, index.resolve(resource_id));
    let tags = render_tags(series);
    if !tags.is_empty() {
        name.push_str(&format!(" {{ {} }}", tags));
    }

    Frame {
        ref_id: ref_id.to_string(),
        name,
        meta: FrameMeta {
            executed_statement: statement.to_string(),
        },
        fields: vec![
            Field::time("Time", series.metric.timestamps.clone()),
            Field::number("Value", series.metric.values.clone()),
        ],
    }
}

/// Single table of per-resource command output
pub fn build_command_frame(
    results: &[CommandResult],
    ref_id: &str,
    statement: &str,
    index: &ResourceIndex,
) -> Frame {
    let mut resource_names = Vec::with_capacity(results.len());
    let mut stdout = Vec::with_capacity(results.len());
    let mut stderr = Vec::with_capacity(results.len());
    let mut exit_status = Vec::with_capacity(results.len());

    for result in results {
        let name = match (&result.pod, &result.host_id) {
            (Some(pod), _) if !pod.is_empty() => pod.clone(),
            (_, Some(host_id)) => {
                let id = host_id.to_string();
                index.resolve(&id).to_string()
            }
            _ => String::new(),
        };
        resource_names.push(name);
        stdout.push(result.stdout.clone());
        stderr.push(result.stderr.clone());
        exit_status.push(Some(result.exit_status as f64));
    }

    Frame {
        ref_id: ref_id.to_string(),
        name: COMMAND_FRAME_NAME.to_string(),
        meta: FrameMeta {
            executed_statement: statement.to_string(),
        },
        fields: vec![
            Field::string("Resource Name", resource_names),
            Field::string("stdout", stdout),
            Field::string("stderr", stderr),
            Field::number("Exit Status", exit_status),
        ],
    }
}

/// Frames for one target's response; shapes without series yield none
///
/// `sent` is used as the executed statement when the backend did not echo
/// one back.
pub fn frames_from_response(response: &BackendResponse, ref_id: &str, sent: &str) -> Vec<Frame> {
    let index = ResourceIndex::build(response.resources());
    let statement = response.statement.as_deref().unwrap_or(sent);

    match &response.payload {
        Payload::MetricSeries(series) => series
            .iter()
            .map(|s| build_frame(s, ref_id, statement, &index))
            .collect(),
        Payload::CommandOutput(results) => {
            vec![build_command_frame(results, ref_id, statement, &index)]
        }
        _ => Vec::new(),
    }
}

/// Orders frames by name, descending
///
/// Dashboards depend on this order; do not flip it.
pub fn sort_frames(mut frames: Vec<Frame>) -> Vec<Frame> {
    frames.sort_by(|a, b| b.name.cmp(&a.name));
    frames
}
