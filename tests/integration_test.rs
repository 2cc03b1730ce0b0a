//! End-to-end tests: breakout engine driven by the backtest loop, feeds and the live
//! session.

mod common;

use approx::assert_abs_diff_eq;
use chrono::NaiveDate;
use common::*;
use volbreak::domain::backtest::{run_backtest, BacktestConfig};
use volbreak::domain::bar::Side;
use volbreak::domain::breakout::BreakoutEngine;
use volbreak::domain::live::LiveSession;
use volbreak::domain::signal::SignalReason;
use volbreak::domain::strategy::Strategy;
use volbreak::ports::data_port::BarFeed;
use volbreak::ports::report_port::ReportPort;
use volbreak::adapters::text_report::TextReport;

fn no_commission() -> BacktestConfig {
    BacktestConfig {
        commission_rate: 0.0,
        ..Default::default()
    }
}

mod breakout_scenarios {
    use super::*;

    #[test]
    fn long_breakout_round_trip_in_one_bar() {
        let mut engine = BreakoutEngine::new();
        let signals = engine.process_data(&scenario_a());

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].side, Side::Buy);
        assert_eq!(signals[0].reason, SignalReason::BreakoutLong);
        assert_abs_diff_eq!(signals[0].suggested_price, 98.5, epsilon = 1e-9);
        assert_eq!(signals[1].side, Side::Sell);
        assert_eq!(signals[1].reason, SignalReason::TakeProfit);
        assert_abs_diff_eq!(signals[1].suggested_price, 103.5, epsilon = 1e-9);
    }

    #[test]
    fn long_breakout_backtest_accounts_commission() {
        let mut engine = BreakoutEngine::new();
        let result = run_backtest(&mut engine, &scenario_a(), &BacktestConfig::default());

        assert_eq!(result.total_trades, 1);
        assert_eq!(result.winning_trades, 1);
        let trade = &result.trades[0];
        assert_abs_diff_eq!(trade.entry_price, 98.5, epsilon = 1e-9);
        assert_abs_diff_eq!(trade.exit_price, 103.5, epsilon = 1e-9);
        assert_abs_diff_eq!(trade.quantity, 40.0, epsilon = 1e-9);
        // 200 gross, 3.94 entry and 4.14 exit commission
        assert_abs_diff_eq!(result.final_balance, 10_191.92, epsilon = 1e-6);
        assert_eq!(result.equity_curve, vec![10_000.0, 10_000.0]);
    }

    #[test]
    fn quiet_day_produces_nothing() {
        let mut bars = scenario_a();
        bars[1] = make_bar(at(2024, 1, 2, 10, 0), 96.0, 97.0, 94.0, 96.0);

        let mut engine = BreakoutEngine::new();
        assert!(engine.process_data(&bars).is_empty());

        let result = run_backtest(&mut BreakoutEngine::new(), &bars, &BacktestConfig::default());
        assert_eq!(result.total_trades, 0);
        assert_abs_diff_eq!(result.final_balance, 10_000.0);
        assert_abs_diff_eq!(result.win_rate, 0.0);
    }

    #[test]
    fn profit_target_takes_priority_over_time_exit() {
        let bars = vec![
            make_bar(at(2024, 1, 1, 10, 0), 95.0, 100.0, 90.0, 95.0),
            make_bar(at(2024, 1, 2, 10, 0), 97.5, 101.0, 97.0, 100.0),
            make_bar(at(2024, 1, 2, 22, 0), 109.0, 112.0, 108.0, 111.0),
        ];
        let mut engine = BreakoutEngine::new();
        engine
            .initialize(&params(&[("stopLossFactor", 2.0), ("profitFactor", 4.0)]))
            .unwrap();

        let mut exits = Vec::new();
        for i in 1..bars.len() {
            exits.extend(
                engine
                    .process_data(&bars[..=i])
                    .into_iter()
                    .filter(|s| s.is_exit()),
            );
        }
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].side, Side::Sell);
        assert_eq!(exits[0].reason, SignalReason::TakeProfit);
        assert_abs_diff_eq!(exits[0].suggested_price, 110.0, epsilon = 1e-9);

        let mut engine = BreakoutEngine::new();
        engine
            .initialize(&params(&[("stop_loss_factor", 2.0), ("profit_factor", 4.0)]))
            .unwrap();
        let result = run_backtest(&mut engine, &bars, &no_commission());
        assert_eq!(result.total_trades, 1);
        assert_abs_diff_eq!(result.trades[0].profit, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.final_balance, 10_200.0, epsilon = 1e-9);
    }

    #[test]
    fn scripted_round_trip_win() {
        let mut strategy = ScriptedStrategy::new(vec![
            (3, Side::Buy, 100.0, 100.0, SignalReason::BreakoutLong),
            (6, Side::Sell, 100.5, 100.0, SignalReason::TakeProfit),
        ]);
        let bars = hourly_bars(
            at(2024, 1, 1, 10, 0),
            &[(100.0, 100.0, 100.0, 100.0); 10],
        );
        let result = run_backtest(&mut strategy, &bars, &BacktestConfig::default());

        assert_eq!(result.total_trades, 1);
        assert_eq!(result.winning_trades, 1);
        assert_abs_diff_eq!(result.win_rate, 100.0);
        // $50 gross less $10.00 entry and $10.05 exit commission
        assert_abs_diff_eq!(result.trades[0].profit, 50.0 - 10.05, epsilon = 1e-9);
        assert_abs_diff_eq!(result.final_balance, 10_000.0 + 50.0 - 10.0 - 10.05, epsilon = 1e-9);
        assert_eq!(result.equity_curve.len(), 10);
        assert_eq!(strategy.calls, 9);
    }

    #[test]
    fn stop_loss_round_trip_is_a_loss() {
        let mut bars = vec![
            make_bar(at(2024, 1, 1, 10, 0), 95.0, 100.0, 90.0, 95.0),
            make_bar(at(2024, 1, 2, 10, 0), 97.5, 101.0, 97.0, 100.0),
        ];
        bars.push(make_bar(at(2024, 1, 2, 12, 0), 99.0, 99.5, 94.0, 94.5));

        let mut engine = BreakoutEngine::new();
        engine.initialize(&params(&[("stopLossFactor", 2.0)])).unwrap();
        let result = run_backtest(&mut engine, &bars, &no_commission());

        assert_eq!(result.losing_trades, 1);
        assert_abs_diff_eq!(result.trades[0].exit_price, 95.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.trades[0].profit, -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.max_drawdown, 0.0);
        assert_abs_diff_eq!(result.total_return, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn open_trade_is_closed_at_last_close() {
        let bars = vec![
            make_bar(at(2024, 1, 1, 10, 0), 95.0, 100.0, 90.0, 95.0),
            make_bar(at(2024, 1, 2, 10, 0), 97.5, 101.0, 97.0, 100.0),
            make_bar(at(2024, 1, 2, 11, 0), 100.0, 103.0, 99.0, 102.0),
        ];
        let mut engine = BreakoutEngine::new();
        engine.initialize(&params(&[("stopLossFactor", 2.0)])).unwrap();
        let result = run_backtest(&mut engine, &bars, &no_commission());

        assert_eq!(result.total_trades, 1);
        assert_abs_diff_eq!(result.trades[0].exit_price, 102.0);
        assert_eq!(result.trades[0].exit_time, at(2024, 1, 2, 11, 0));
        assert!(engine.active_trade(SYMBOL).is_some());
    }
}

mod feeds {
    use super::*;

    #[test]
    fn empty_feed_yields_zero_trade_result() {
        let feed = MockBarFeed::new();
        let bars = feed.fetch_history(SYMBOL, "1h", None, None);
        let result = run_backtest(&mut BreakoutEngine::new(), &bars, &BacktestConfig::default());

        assert_eq!(result.equity_curve, vec![10_000.0]);
        assert_eq!(result.total_trades, 0);
        assert!(feed.current_price(SYMBOL).is_none());
    }

    #[test]
    fn feed_date_range_limits_the_backtest() {
        let feed = MockBarFeed::new().with_bars(SYMBOL, scenario_a());
        let day_one = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = feed.fetch_history(SYMBOL, "1h", Some(day_one), Some(day_one));
        assert_eq!(bars.len(), 1);

        let result = run_backtest(&mut BreakoutEngine::new(), &bars, &BacktestConfig::default());
        assert_eq!(result.total_trades, 0);
        assert_eq!(feed.current_price(SYMBOL), Some(130.0));
    }

    #[test]
    fn report_renders_backtest() {
        let result = run_backtest(
            &mut BreakoutEngine::new(),
            &scenario_a(),
            &BacktestConfig::default(),
        );
        let text = TextReport::default().render(&result);
        assert!(text.contains("Final balance"));
        assert!(text.contains("10191.92"));
        assert!(text.contains("BTCUSDT"));
    }
}

mod live_session {
    use super::*;

    #[test]
    fn replays_history_then_trades_pushed_bars() {
        let history = scenario_a()[..1].to_vec();
        let mut session = LiveSession::with_history(
            BreakoutEngine::new(),
            RecordingOrderSink::default(),
            history,
        );

        let placed = session.on_bar(scenario_a()[1].clone());
        assert_eq!(placed.len(), 2);
        let (_, sink) = session.into_parts();
        assert_eq!(sink.orders[0], (SYMBOL.to_string(), Side::Buy, 40.0, 98.5));
        assert_eq!(sink.orders[1], (SYMBOL.to_string(), Side::Sell, 40.0, 103.5));
    }

    #[test]
    fn repeated_bar_places_nothing() {
        let mut session = LiveSession::new(BreakoutEngine::new(), RecordingOrderSink::default());
        for bar in scenario_a() {
            session.on_bar(bar);
        }
        let again = session.on_bar(scenario_a()[1].clone());
        assert!(again.is_empty());
        assert_eq!(session.sink().orders.len(), 2);
    }
}
