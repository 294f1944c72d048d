use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::models::stats::sort_breakdown;
use crate::models::{now_stamp, Booking, BreakdownEntry, DashboardStats};
use crate::services::stats::PeriodStarts;
use crate::store::error::{Result, StoreError};
use crate::store::{migrations, new_booking_id, BookingFilter, BookingStore, TransitionPlan};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Direct Store: one row per booking in sqlite. The full record is kept as
/// JSON in `data`; the columns that filters, ordering and aggregates touch
/// are mirrored and indexed. Updates run read-merge-write inside a single
/// transaction.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(path).context("failed to open database")?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("failed to set database pragmas")?;

        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("database connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn create(&self, draft: Booking) -> Result<Booking> {
        let now = now_stamp();
        let booking = Booking {
            id: new_booking_id(),
            created_at: now,
            updated_at: now,
            ..draft
        };

        let conn = self.lock()?;
        insert_booking(&conn, &booking)?;
        Ok(booking)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let conn = self.lock()?;
        query_bookings(&conn, filter)
    }

    async fn get(&self, id: &str) -> Result<Option<Booking>> {
        let conn = self.lock()?;
        find_booking(&conn, id)
    }

    async fn update_checked(&self, id: &str, plan: TransitionPlan<'_>) -> Result<Booking> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let mut booking =
            find_booking(&tx, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let patch = plan(&booking)?;
        patch.apply(&mut booking);
        booking.updated_at = now_stamp();
        write_booking(&tx, &booking)?;

        tx.commit()?;
        Ok(booking)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let conn = self.lock()?;
        let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
        if count == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn aggregate_stats(&self, now: NaiveDateTime) -> Result<DashboardStats> {
        let conn = self.lock()?;
        dashboard_stats(&conn, now)
    }
}

fn insert_booking(conn: &Connection, booking: &Booking) -> Result<()> {
    let data = serde_json::to_string(booking)?;

    conn.execute(
        "INSERT INTO bookings (id, customer_name, email, phone_number, service, preferred_date,
                               status, booking_source, total_price, payment_status, call_status,
                               call_duration, created_at, updated_at, data)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            booking.id,
            booking.customer_name,
            booking.email,
            booking.phone_number,
            booking.service,
            booking.preferred_date.format(DATE_FORMAT).to_string(),
            booking.status.as_str(),
            booking.booking_source.as_str(),
            booking.total_price,
            booking.payment_status.as_str(),
            booking.call_status.as_str(),
            booking.call_duration,
            booking.created_at.format(TIMESTAMP_FORMAT).to_string(),
            booking.updated_at.format(TIMESTAMP_FORMAT).to_string(),
            data,
        ],
    )?;
    Ok(())
}

fn write_booking(conn: &Connection, booking: &Booking) -> Result<()> {
    let data = serde_json::to_string(booking)?;

    conn.execute(
        "UPDATE bookings SET customer_name = ?2, email = ?3, phone_number = ?4, service = ?5,
                preferred_date = ?6, status = ?7, booking_source = ?8, total_price = ?9,
                payment_status = ?10, call_status = ?11, call_duration = ?12,
                updated_at = ?13, data = ?14
         WHERE id = ?1",
        params![
            booking.id,
            booking.customer_name,
            booking.email,
            booking.phone_number,
            booking.service,
            booking.preferred_date.format(DATE_FORMAT).to_string(),
            booking.status.as_str(),
            booking.booking_source.as_str(),
            booking.total_price,
            booking.payment_status.as_str(),
            booking.call_status.as_str(),
            booking.call_duration,
            booking.updated_at.format(TIMESTAMP_FORMAT).to_string(),
            data,
        ],
    )?;
    Ok(())
}

fn find_booking(conn: &Connection, id: &str) -> Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT data FROM bookings WHERE id = ?1",
        params![id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn query_bookings(conn: &Connection, filter: &BookingFilter) -> Result<Vec<Booking>> {
    let mut clauses: Vec<&str> = vec![];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(status) = filter.status {
        clauses.push("status = ?");
        params_vec.push(Box::new(status.as_str()));
    }
    if let Some(date) = filter.date {
        clauses.push("preferred_date = ?");
        params_vec.push(Box::new(date.format(DATE_FORMAT).to_string()));
    }

    let mut sql = "SELECT data FROM bookings".to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, rowid DESC");

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| row.get::<_, String>(0))?;

    // sqlite's lower() folds ASCII only, so text search runs on decoded rows.
    let mut bookings = vec![];
    for row in rows {
        let booking: Booking = serde_json::from_str(&row?)?;
        if filter.matches(&booking) {
            bookings.push(booking);
        }
    }
    Ok(bookings)
}

fn dashboard_stats(conn: &Connection, now: NaiveDateTime) -> Result<DashboardStats> {
    let periods = PeriodStarts::at(now);
    let today = periods.today.format(TIMESTAMP_FORMAT).to_string();
    let month = periods.month.format(TIMESTAMP_FORMAT).to_string();
    let year = periods.year.format(TIMESTAMP_FORMAT).to_string();

    let mut stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(created_at >= ?1), 0),
                COALESCE(SUM(created_at >= ?2), 0),
                COALESCE(SUM(created_at >= ?3), 0),
                COALESCE(SUM(status = 'pending'), 0),
                COALESCE(SUM(status = 'confirmed'), 0),
                COALESCE(SUM(status = 'completed'), 0),
                COALESCE(SUM(status = 'cancelled'), 0),
                COALESCE(SUM(CASE WHEN status = 'completed' AND payment_status = 'paid'
                                  THEN total_price END), 0.0),
                COALESCE(SUM(call_status = 'completed'), 0),
                COALESCE(AVG(CASE WHEN call_duration > 0 THEN call_duration END), 0.0)
         FROM bookings",
        params![today, month, year],
        |row| {
            let count =
                |i: usize| -> rusqlite::Result<u64> { Ok(row.get::<_, i64>(i)?.max(0) as u64) };
            Ok(DashboardStats {
                total_bookings: count(0)?,
                today_bookings: count(1)?,
                month_bookings: count(2)?,
                year_bookings: count(3)?,
                pending_bookings: count(4)?,
                confirmed_bookings: count(5)?,
                completed_bookings: count(6)?,
                cancelled_bookings: count(7)?,
                total_revenue: row.get(8)?,
                calls_completed: count(9)?,
                average_call_duration: row.get(10)?,
                booking_sources: vec![],
                services: vec![],
            })
        },
    )?;

    stats.booking_sources = breakdown(conn, "booking_source")?;
    stats.services = breakdown(conn, "service")?;
    Ok(stats)
}

// `column` is always one of our own column names, never caller input.
fn breakdown(conn: &Connection, column: &str) -> Result<Vec<BreakdownEntry>> {
    let sql = format!("SELECT {column}, COUNT(*) FROM bookings GROUP BY {column}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(BreakdownEntry {
            name: row.get(0)?,
            count: row.get::<_, i64>(1)?.max(0) as u64,
        })
    })?;

    let mut entries = vec![];
    for row in rows {
        entries.push(row?);
    }
    sort_breakdown(&mut entries);
    Ok(entries)
}
