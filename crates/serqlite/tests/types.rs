//! Values written through the engine and read back through declared-type decoding.

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serqlite::{Datum, DecodeError, Error, QueryOptions, Row, StorageClass, codec};
    use serqlite_test::tdb;
    use time::macros::{date, datetime};

    fn first_row(conn: &serqlite::Connection, sql: &str) -> anyhow::Result<Row> {
        let mut rows = conn
            .query(sql, &QueryOptions::new())?
            .into_list()
            .expect("list");
        Ok(rows.remove(0))
    }

    #[test]
    fn it_round_trips_every_kind() -> anyhow::Result<()> {
        let conn = tdb()?;
        let at = datetime!(2024-03-01 12:30:45.123456);
        let amount = Decimal::from_str("1234.56")?;

        conn.execute(
            "INSERT INTO events (name, happened_at, day, active, amount, ratio, payload)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            &QueryOptions::new()
                .bind("launch")
                .bind(at)
                .bind(date!(2024 - 03 - 01))
                .bind(true)
                .bind(amount)
                .bind(0.25_f64)
                .bind(vec![0_u8, 1, 2, 255]),
        )?;

        let row = first_row(
            &conn,
            "SELECT id, name, happened_at, day, active, amount, ratio, payload FROM events",
        )?;
        assert_eq!(
            row.values(),
            &[
                Datum::Integer(1),
                Datum::Text("launch".into()),
                Datum::Timestamp(at),
                Datum::Date(date!(2024 - 03 - 01)),
                Datum::Bool(true),
                Datum::Decimal(amount),
                Datum::Float(0.25),
                Datum::Blob(vec![0, 1, 2, 255]),
            ]
        );

        assert_eq!(row.get::<i32>("id")?, 1);
        assert_eq!(row.get::<&str>("name")?, "launch");
        assert_eq!(row.get::<time::PrimitiveDateTime>("happened_at")?, at);
        assert_eq!(
            row.get::<time::PrimitiveDateTime>("day")?,
            datetime!(2024-03-01 0:00)
        );
        assert!(row.get::<bool>("active")?);
        assert_eq!(row.get::<Decimal>("amount")?, amount);
        assert_eq!(row.get::<f64>("ratio")?, 0.25);
        assert_eq!(row.get::<Vec<u8>>("payload")?, vec![0, 1, 2, 255]);
        Ok(())
    }

    #[test]
    fn timestamps_keep_microseconds_only() -> anyhow::Result<()> {
        let conn = tdb()?;
        conn.execute(
            "INSERT INTO events (name, happened_at) VALUES ('t', ?)",
            &QueryOptions::new().bind(datetime!(2021-01-02 03:04:05.123456789)),
        )?;

        let row = first_row(&conn, "SELECT happened_at, CAST(happened_at AS TEXT) AS raw FROM events")?;
        assert_eq!(row.get::<&str>("raw")?, "2021-01-02 03:04:05.123456");
        assert_eq!(
            row.get::<time::PrimitiveDateTime>("happened_at")?,
            datetime!(2021-01-02 03:04:05.123456)
        );
        Ok(())
    }

    #[test]
    fn timestamps_without_fraction_are_accepted() -> anyhow::Result<()> {
        let conn = tdb()?;
        conn.exec("INSERT INTO events (name, happened_at) VALUES ('t', '2020-02-29 23:59:59')")?;
        let row = first_row(&conn, "SELECT happened_at FROM events")?;
        assert_eq!(
            row.values()[0],
            Datum::Timestamp(datetime!(2020-02-29 23:59:59))
        );
        Ok(())
    }

    #[test]
    fn decimal_is_rounded_to_declared_scale() -> anyhow::Result<()> {
        let conn = tdb()?;
        conn.execute(
            "INSERT INTO prices (price) VALUES (?)",
            &QueryOptions::new().bind(Decimal::from_str("244.37")?),
        )?;
        conn.execute(
            "INSERT INTO prices (price) VALUES (?)",
            &QueryOptions::new().bind(Decimal::from_str("1.005")?),
        )?;
        conn.execute(
            "INSERT INTO prices (price) VALUES (?)",
            &QueryOptions::new().bind(12_i64),
        )?;

        let rows = conn
            .query("SELECT price FROM prices ORDER BY id", &QueryOptions::new())?
            .into_list()
            .expect("list");
        let prices = rows
            .iter()
            .map(|r| r.get_idx::<Decimal>(0))
            .collect::<serqlite::Result<Vec<_>>>()?;
        assert_eq!(
            prices,
            vec![
                Decimal::from_str("244.37")?,
                Decimal::from_str("1.01")?,
                Decimal::from(12),
            ]
        );
        Ok(())
    }

    #[test]
    fn decimal_columns_keep_double_precision() -> anyhow::Result<()> {
        let conn = tdb()?;
        for amount in ["1234567890123.45", "12345678901234567.89"] {
            conn.execute(
                "INSERT INTO events (name, amount) VALUES ('d', ?)",
                &QueryOptions::new().bind(Decimal::from_str(amount)?),
            )?;
        }

        let rows = conn
            .query("SELECT amount FROM events ORDER BY id", &QueryOptions::new())?
            .into_list()
            .expect("list");
        assert_eq!(
            rows[0].get_idx::<Decimal>(0)?,
            Decimal::from_str("1234567890123.45")?
        );
        // Stored as a REAL by the column's NUMERIC affinity.
        assert_eq!(
            rows[1].get_idx::<Decimal>(0)?,
            Decimal::from_str("12345678901234568")?
        );
        Ok(())
    }

    #[test]
    fn mismatched_text_is_a_decode_error() -> anyhow::Result<()> {
        let conn = tdb()?;
        conn.exec("INSERT INTO events (name, happened_at) VALUES ('bad', 'last tuesday')")?;

        let err = conn
            .query("SELECT happened_at FROM events", &QueryOptions::new())
            .unwrap_err();
        match err {
            Error::ColumnDecode { column, source } => {
                assert_eq!(column, "happened_at");
                assert_eq!(
                    source,
                    DecodeError::Pattern {
                        raw: "last tuesday".into(),
                        expected: "YYYY-MM-DD HH:MM:SS[.ffffff]",
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(conn.open_statements(), 0);
        Ok(())
    }

    #[test]
    fn boolean_columns_only_hold_zero_or_one() -> anyhow::Result<()> {
        let conn = tdb()?;
        conn.exec("INSERT INTO events (name, active) VALUES ('x', 2)")?;
        let err = conn
            .query("SELECT active FROM events", &QueryOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnDecode {
                source: DecodeError::Pattern { .. },
                ..
            }
        ));

        conn.exec("UPDATE events SET active = x'00'")?;
        let err = conn
            .query("SELECT active FROM events", &QueryOptions::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ColumnDecode {
                source: DecodeError::StorageClass {
                    found: StorageClass::Blob,
                    ..
                },
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn expressions_decode_natively() -> anyhow::Result<()> {
        let conn = tdb()?;
        let row = first_row(&conn, "SELECT '2024-01-01', 1.5, x'0102', NULL")?;
        assert_eq!(
            row.values(),
            &[
                Datum::Text("2024-01-01".into()),
                Datum::Float(1.5),
                Datum::Blob(vec![1, 2]),
                Datum::Null,
            ]
        );
        Ok(())
    }

    #[test]
    fn codec_is_usable_without_a_connection() {
        let value = codec::encode(Datum::Bool(false));
        assert_eq!(
            codec::decode(&value, Some("BOOLEAN")),
            Ok(Datum::Bool(false))
        );
        assert_eq!(
            codec::decode(&value, Some("INTEGER")),
            Ok(Datum::Integer(0))
        );
    }
}
