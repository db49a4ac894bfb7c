// ── Alarms ──
//
// Always the site API. `stat/alarm` is the primary list; an explicit
// archived filter adds `rest/alarm?archived=..`, merged over the primary.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use unimux_api::models::{LegacyAlarm, LegacyEnvelope};
use unimux_api::{ApiRequest, TargetClient, site_path};

use super::{FetchOptions, expect_success};
use crate::envelope::ResultEnvelope;
use crate::error::CoreError;
use crate::model::Alarm;

/// List alarms, merging the archived-filtered list when `archived` is given.
pub async fn get_alarms(
    client: &TargetClient,
    opts: &FetchOptions,
    archived: Option<bool>,
) -> Result<ResultEnvelope<Vec<Alarm>>, CoreError> {
    client.ensure_session().await?;
    let target = client.target();
    let site = opts.site_for(client);

    let primary = expect_success(
        client
            .send(ApiRequest::get(site_path(target, site, "stat/alarm")))
            .await?,
    )?;
    let primary_list: LegacyEnvelope<LegacyAlarm> = primary.json()?;
    let mut truncated = primary_list.truncated();
    let mut merged = merge_by_key(IndexMap::new(), primary_list.data);

    let mut raw = Map::new();
    if let Some(archived) = archived {
        let req = ApiRequest::get(site_path(target, site, "rest/alarm")).query("archived", archived);
        let secondary = expect_success(client.send(req).await?)?;
        let secondary_list: LegacyEnvelope<LegacyAlarm> = secondary.json()?;
        truncated |= secondary_list.truncated();
        merged = merge_by_key(merged, secondary_list.data);
        raw.insert("archived".into(), secondary.body);
    }
    raw.insert("primary".into(), primary.body);

    let alarms = merged.into_values().map(Alarm::from).collect();
    Ok(ResultEnvelope::new(alarms)
        .truncated(truncated)
        .with_raw(opts.raw, || Value::Object(raw)))
}

/// Insert `list` into `acc` by merge key. A later entry replaces an earlier
/// one in place, keeping first-seen order.
fn merge_by_key(
    mut acc: IndexMap<String, LegacyAlarm>,
    list: Vec<LegacyAlarm>,
) -> IndexMap<String, LegacyAlarm> {
    for alarm in list {
        acc.insert(alarm.merge_key(), alarm);
    }
    acc
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn later_list_wins_on_collision() {
        let primary: Vec<LegacyAlarm> =
            serde_json::from_value(json!([{ "_id": "a", "time": 1 }])).unwrap();
        let archived: Vec<LegacyAlarm> = serde_json::from_value(json!([
            { "_id": "a", "time": 1, "archived": true },
            { "_id": "b", "time": 2 }
        ]))
        .unwrap();

        let merged = merge_by_key(merge_by_key(IndexMap::new(), primary), archived);
        let alarms: Vec<Alarm> = merged.into_values().map(Alarm::from).collect();

        assert_eq!(alarms.len(), 2);
        assert_eq!(alarms[0].time, 1);
        assert!(alarms[0].archived);
        assert_eq!(alarms[1].time, 2);
    }

    #[test]
    fn synthetic_keys_deduplicate_id_less_alarms() {
        let list: Vec<LegacyAlarm> = serde_json::from_value(json!([
            { "time": 5, "key": "EVT_GW_WANTransition", "msg": "old" },
            { "time": 5, "key": "EVT_GW_WANTransition", "msg": "new" },
            { "time": 6, "key": "EVT_GW_WANTransition" }
        ]))
        .unwrap();
        let merged = merge_by_key(IndexMap::new(), list);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["5-EVT_GW_WANTransition"].msg.as_deref(), Some("new"));
    }
}
