pub mod d400_analytics_report;
