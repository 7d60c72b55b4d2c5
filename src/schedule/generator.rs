use crate::models::asset::{ScheduleInput, TimeAnchor};
use crate::models::record::AssetDepreciationRecord;
use crate::schedule::policy::{SchedulePolicy, ZeroElapsedPolicy, MONTHS_PER_YEAR};
use chrono::{DateTime, Datelike, Utc};

/// Schedules always open on the first month of the financial year.
pub const STARTING_MONTH: u32 = 1;

/// Fixed per-month reduction derived from the annual rate.
pub fn monthly_depreciation_cost(initial_cost: f64, depreciation_percentage: f64) -> f64 {
    initial_cost * depreciation_percentage / 100.0 / 12.0
}

/// Last schedule month (inclusive). Zero means nothing is emitted.
pub fn end_month(starting_month: u32, months_passed: i64, zero_elapsed: ZeroElapsedPolicy) -> u32 {
    if months_passed == 0 {
        return match zero_elapsed {
            ZeroElapsedPolicy::FullYear => MONTHS_PER_YEAR,
            ZeroElapsedPolicy::SingleMonth => starting_month,
        };
    }

    (i64::from(starting_month) + months_passed).clamp(0, i64::from(MONTHS_PER_YEAR)) as u32
}

/// Time-anchor fields shared by every row of one schedule.
struct ResolvedAnchor {
    months_passed: i64,
    month_cap: Option<u32>,
    mfd: Option<DateTime<Utc>>,
    manufacturing_year: Option<i32>,
    manufacturing_month: Option<u32>,
}

fn resolve_anchor(
    anchor: TimeAnchor,
    now: DateTime<Utc>,
    policy: &SchedulePolicy,
) -> ResolvedAnchor {
    match anchor {
        TimeAnchor::Month(month) => ResolvedAnchor {
            months_passed: i64::from(month) - 1,
            month_cap: Some(month),
            mfd: None,
            manufacturing_year: None,
            manufacturing_month: Some(now.month()),
        },
        TimeAnchor::ManufacturedOn(mfd) => ResolvedAnchor {
            months_passed: policy.month_counting.months_between(mfd, now),
            month_cap: None,
            mfd: Some(mfd),
            manufacturing_year: Some(mfd.year()),
            manufacturing_month: Some(mfd.month()),
        },
    }
}

/// Builds the monthly schedule for one asset.
///
/// The running total starts at the initial cost and is reduced once per
/// visited month before the explicit-month cut-off is checked, so row `m`
/// always carries `initial_cost - m * monthly_depreciation_cost`.
/// Deterministic for a fixed `now`.
pub fn generate(
    input: &ScheduleInput,
    now: DateTime<Utc>,
    policy: &SchedulePolicy,
) -> Vec<AssetDepreciationRecord> {
    let monthly = monthly_depreciation_cost(input.initial_cost, input.depreciation_percentage);
    let anchor = resolve_anchor(input.anchor, now, policy);
    let last = end_month(STARTING_MONTH, anchor.months_passed, policy.zero_elapsed);

    (STARTING_MONTH..=last)
        .scan(input.initial_cost, |total, m| {
            *total -= monthly;
            if anchor.month_cap.is_some_and(|cap| cap < m) {
                return None;
            }
            Some((m, *total))
        })
        .map(|(m, total)| AssetDepreciationRecord {
            asset_id: input.asset_id.clone(),
            company_id: input.company_id.clone(),
            financial_year: input.financial_year.clone(),
            month: m,
            initial_cost: input.initial_cost,
            depreciation_percentage: input.depreciation_percentage,
            monthly_depreciation_cost: monthly,
            total_depreciated_cost: if policy.floor_at_zero { total.max(0.0) } else { total },
            mfd: anchor.mfd,
            manufacturing_year: anchor.manufacturing_year,
            manufacturing_month: anchor.manufacturing_month,
        })
        .collect()
}

pub fn generate_now(
    input: &ScheduleInput,
    policy: &SchedulePolicy,
) -> Vec<AssetDepreciationRecord> {
    generate(input, Utc::now(), policy)
}
