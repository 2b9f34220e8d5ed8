use kabuka_core::market::entity::{Rankings, StockRecord};

/// 每个榜单的长度
pub const RANKING_SIZE: usize = 10;

fn top_by<F>(stocks: &[&StockRecord], metric: F, ascending: bool) -> Vec<StockRecord>
where
    F: Fn(&StockRecord) -> Option<f64>,
{
    let mut ranked: Vec<(f64, &StockRecord)> = stocks
        .iter()
        .filter_map(|s| metric(s).filter(|v| *v > 0.0).map(|v| (v, *s)))
        .collect();
    ranked.sort_by(|a, b| {
        let ord = a.0.total_cmp(&b.0);
        if ascending { ord } else { ord.reverse() }
    });
    ranked
        .into_iter()
        .take(RANKING_SIZE)
        .map(|(_, s)| s.clone())
        .collect()
}

/// # Summary
/// 计算各指标 Top10 榜单。
///
/// # Logic
/// 1. PER / PBR / 股息率 / ROE 榜单只考虑这三项估值指标中至少一项为正的证券，且该指标本身为正。
/// 2. PER、PBR 升序；股息率、ROE 降序。
/// 3. 割安度评分榜覆盖全部证券，降序；同分保持原顺序。
pub fn rankings(stocks: &[StockRecord]) -> Rankings {
    let valued: Vec<&StockRecord> = stocks
        .iter()
        .filter(|s| {
            [s.per, s.pbr, s.dividend_yield]
                .iter()
                .any(|v| v.is_some_and(|x| x > 0.0))
        })
        .collect();

    let mut by_score: Vec<&StockRecord> = stocks.iter().collect();
    by_score.sort_by(|a, b| b.value_score.cmp(&a.value_score));

    Rankings {
        per: top_by(&valued, |s| s.per, true),
        pbr: top_by(&valued, |s| s.pbr, true),
        dividend: top_by(&valued, |s| s.dividend_yield, false),
        roe: top_by(&valued, |s| s.roe, false),
        value_score: by_score.into_iter().take(RANKING_SIZE).cloned().collect(),
    }
}
