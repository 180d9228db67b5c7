use crate::model::KpiTemplate;
use crate::utils::month::Month;
use std::collections::HashMap;
use tracing::{debug, warn};

pub fn resolve_applicable_templates(
    templates: &[KpiTemplate],
    target_month: Month,
    explicit_id: Option<&str>,
) -> Vec<KpiTemplate> {
    if let Some(key) = explicit_id {
        return templates
            .iter()
            .filter(|template| template.id == key || template.code == key)
            .cloned()
            .collect();
    }

    let mut codes: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<(Month, &KpiTemplate)>> = HashMap::new();
    for template in templates.iter().filter(|template| template.is_active()) {
        let effective = effective_month(template);
        let group = groups.entry(template.code.as_str()).or_insert_with(|| {
            codes.push(template.code.as_str());
            Vec::new()
        });
        group.push((effective, template));
    }

    codes
        .into_iter()
        .filter_map(|code| {
            let versions = groups.get(code)?;
            let chosen = pick_version(versions, target_month)?;
            debug!(
                code,
                id = %chosen.id,
                target = %target_month,
                "resolved template version"
            );
            Some(chosen.clone())
        })
        .collect()
}

/// Latest version not after `target_month`; when every version starts later,
/// the earliest one. Among equal months the later-declared version wins.
fn pick_version<'a>(
    versions: &[(Month, &'a KpiTemplate)],
    target_month: Month,
) -> Option<&'a KpiTemplate> {
    let eligible = versions
        .iter()
        .filter(|(effective, _)| *effective <= target_month)
        .fold(None, |best: Option<&(Month, &KpiTemplate)>, candidate| match best {
            Some(current) if current.0 > candidate.0 => Some(current),
            _ => Some(candidate),
        });
    if let Some((_, template)) = eligible {
        return Some(*template);
    }

    versions
        .iter()
        .fold(None, |best: Option<&(Month, &KpiTemplate)>, candidate| match best {
            Some(current) if current.0 < candidate.0 => Some(current),
            _ => Some(candidate),
        })
        .map(|(_, template)| *template)
}

fn effective_month(template: &KpiTemplate) -> Month {
    match Month::parse_or_epoch(template.effective_month.as_deref()) {
        Ok(month) => month,
        Err(err) => {
            warn!(id = %template.id, code = %template.code, "{err}; treating as always effective");
            Month::EPOCH
        }
    }
}

pub fn find_template<'a>(
    templates: &'a [KpiTemplate],
    key: &str,
    month: Month,
) -> Option<&'a KpiTemplate> {
    if let Some(by_id) = templates.iter().find(|template| template.id == key) {
        return Some(by_id);
    }

    let resolved = resolve_applicable_templates(templates, month, None);
    let code_match = resolved.into_iter().find(|template| template.code == key)?;
    templates.iter().find(|template| template.id == code_match.id)
}
