mod util;

use std::env;

use ::author::{NewAuthor, hash_password};
use booking::NewBooking;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use clap::{Error, Parser};
use comment::NewComment;
use common::DbConn;
use db::{BookingState, PostState};
use deadpool_diesel::postgres::{Manager, Pool};
use diesel::prelude::*;
use fake::Fake;
use fake::faker::address::raw::{BuildingNumber, StreetName};
use fake::faker::internet::raw::{FreeEmail, Username};
use fake::faker::lorem::raw::{Paragraph, Sentence};
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use location::NewLocation;
use rand::seq::IndexedRandom;
use rand::rngs::ThreadRng;
use rand::{Rng, rng};

use crate::util::{batch_insert, generate_unique_set, io_error};

/// Cities posts are spread over, with a rough centre to scatter them around
const CITIES: [(&str, f64, f64); 5] = [
	("beijing", 39.9042, 116.4074),
	("shanghai", 31.2304, 121.4737),
	("guangzhou", 23.1291, 113.2644),
	("shenzhen", 22.5431, 114.0579),
	("chengdu", 30.5728, 104.0668),
];

const POST_TYPES: [&str; 4] = ["office", "cafe", "meeting_room", "studio"];

/// Password of every seeded author
const SEED_PASSWORD: &str = "webizcafe";

#[derive(Parser, Debug)]
struct Opt {
	#[arg(long, short = 'a', default_value_t = 1_000)]
	authors:  usize,
	#[arg(long, short = 'p', default_value_t = 5_000)]
	posts:    usize,
	#[arg(long, short = 'c', default_value_t = 20_000)]
	comments: usize,
	/// Bookings per post
	#[arg(long, short = 'b', default_value_t = 4)]
	bookings: usize,
}

/// Insertable post row with an already resolved location
#[derive(Insertable)]
#[diesel(table_name = db::post)]
struct SeedPost {
	author_id:   i32,
	location_id: i32,
	title:       String,
	content:     String,
	price_cents: i64,
	capacity:    i32,
	city:        String,
	post_type:   String,
	state:       PostState,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
	let cli = Opt::parse();
	let conn = get_conn().await?;

	println!("Seeding {} authors…", cli.authors);
	let author_ids = seed_authors(&conn, cli.authors).await?;

	if author_ids.is_empty() {
		return Ok(());
	}

	println!("Seeding {} posts…", cli.posts);
	let post_ids = seed_posts(&conn, cli.posts, &author_ids).await?;

	if post_ids.is_empty() {
		return Ok(());
	}

	println!("Seeding {} comments…", cli.comments);
	let inserted =
		seed_comments(&conn, cli.comments, &author_ids, &post_ids).await?;
	println!("Inserted {inserted} comments");

	println!("Seeding {} bookings per post…", cli.bookings);
	let inserted =
		seed_bookings(&conn, cli.bookings, &author_ids, &post_ids).await?;
	println!("Inserted {inserted} bookings");

	Ok(())
}

/// Get a database connection from the pool
async fn get_conn() -> Result<DbConn, Error> {
	let database_url = env::var("DATABASE_URL").map_err(io_error)?;

	let manager = Manager::new(database_url, deadpool_diesel::Runtime::Tokio1);
	let pool = Pool::builder(manager).build().map_err(io_error)?;

	pool.get().await.map_err(io_error)
}

/// Seed active authors with unique usernames and emails, all sharing one
/// password
async fn seed_authors(conn: &DbConn, count: usize) -> Result<Vec<i32>, Error> {
	let password_hash = hash_password(SEED_PASSWORD).map_err(io_error)?;

	let usernames =
		generate_unique_set(count, || Username(EN).fake::<String>());
	let emails = generate_unique_set(count, || FreeEmail(EN).fake::<String>());

	let authors: Vec<NewAuthor> = usernames
		.into_iter()
		.zip(emails)
		.map(|(username, email)| {
			NewAuthor {
				username,
				email,
				password_hash: password_hash.clone(),
				first_name: FirstName(EN).fake(),
				last_name: LastName(EN).fake(),
				birthday: None,
				phone_number: None,
				is_active: true,
				activation_token: None,
				activation_token_expiry: None,
			}
		})
		.collect();

	batch_insert(conn, "authors", authors, 4096, |conn, chunk| {
		use db::author::dsl::*;

		diesel::insert_into(author).values(chunk).returning(id).get_results(conn)
	})
	.await
}

/// Seed posts, each at its own freshly generated address
async fn seed_posts(
	conn: &DbConn,
	count: usize,
	author_ids: &[i32],
) -> Result<Vec<i32>, Error> {
	let mut rng = rng();

	let addresses = generate_unique_set(count, || {
		let number: String = BuildingNumber(EN).fake();
		let street: String = StreetName(EN).fake();

		format!("{number} {street}")
	});

	let mut cities = Vec::with_capacity(count);
	let locations: Vec<NewLocation> = addresses
		.into_iter()
		.map(|address| {
			let (city, lat, lng) = *CITIES.choose(&mut rng).unwrap_or(&CITIES[0]);
			cities.push(city);

			NewLocation {
				address,
				latitude: lat + rng.random_range(-0.2..=0.2),
				longitude: lng + rng.random_range(-0.2..=0.2),
			}
		})
		.collect();

	let location_ids =
		batch_insert(conn, "locations", locations, 4096, |conn, chunk| {
			use db::location::dsl::*;

			diesel::insert_into(location)
				.values(chunk)
				.returning(id)
				.get_results(conn)
		})
		.await?;

	let posts: Vec<SeedPost> = location_ids
		.into_iter()
		.zip(cities)
		.map(|(location_id, city)| {
			let state = if rng.random_bool(0.9) {
				PostState::Published
			} else {
				PostState::Closed
			};

			SeedPost {
				author_id: *author_ids.choose(&mut rng).unwrap_or(&author_ids[0]),
				location_id,
				title: Sentence(EN, 2..5).fake(),
				content: Paragraph(EN, 1..4).fake(),
				price_cents: rng.random_range(1_000..=50_000),
				capacity: rng.random_range(1..=80),
				city: city.to_string(),
				post_type: (*POST_TYPES.choose(&mut rng).unwrap_or(&"office"))
					.to_string(),
				state,
			}
		})
		.collect();

	batch_insert(conn, "posts", posts, 4096, |conn, chunk| {
		use db::post::dsl::*;

		diesel::insert_into(post).values(chunk).returning(id).get_results(conn)
	})
	.await
}

/// Seed top level comments, then answer roughly a third of them
async fn seed_comments(
	conn: &DbConn,
	count: usize,
	author_ids: &[i32],
	post_ids: &[i32],
) -> Result<usize, Error> {
	let mut rng = rng();

	let replies = count / 3;
	let roots = count - replies;

	let new_comment = |rng: &mut ThreadRng, post_id: i32, parent_id: Option<i32>| {
		NewComment {
			author_id: *author_ids.choose(rng).unwrap_or(&author_ids[0]),
			post_id,
			parent_id,
			content: Sentence(EN, 3..12).fake_with_rng(rng),
			rating: rng.random_range(0..=10),
		}
	};

	let root_posts: Vec<i32> = (0..roots)
		.map(|_| *post_ids.choose(&mut rng).unwrap_or(&post_ids[0]))
		.collect();
	let root_comments: Vec<NewComment> =
		root_posts.iter().map(|&p| new_comment(&mut rng, p, None)).collect();

	let root_ids =
		batch_insert(conn, "comments", root_comments, 4096, |conn, chunk| {
			use db::comment::dsl::*;

			diesel::insert_into(comment)
				.values(chunk)
				.returning(id)
				.get_results(conn)
		})
		.await?;

	if root_ids.is_empty() {
		return Ok(0);
	}

	let threads: Vec<(i32, i32)> = root_ids.into_iter().zip(root_posts).collect();
	let reply_comments: Vec<NewComment> = (0..replies)
		.map(|_| {
			let (parent, post_id) = *threads.choose(&mut rng).unwrap_or(&threads[0]);

			new_comment(&mut rng, post_id, Some(parent))
		})
		.collect();

	let reply_ids =
		batch_insert(conn, "replies", reply_comments, 4096, |conn, chunk| {
			use db::comment::dsl::*;

			diesel::insert_into(comment)
				.values(chunk)
				.returning(id)
				.get_results(conn)
		})
		.await?;

	Ok(threads.len() + reply_ids.len())
}

/// Seed back to back, non overlapping bookings on every post and approve
/// about half of them
async fn seed_bookings(
	conn: &DbConn,
	per_post: usize,
	author_ids: &[i32],
	post_ids: &[i32],
) -> Result<usize, Error> {
	let mut rng = rng();

	let today = Utc::now().date_naive();
	let start_of = |day: NaiveDate| -> NaiveDateTime {
		day.and_hms_opt(8, 0, 0).unwrap_or_default()
	};

	let bookings: Vec<NewBooking> = post_ids
		.iter()
		.flat_map(|&post_id| {
			let mut cursor = start_of(today + Duration::days(rng.random_range(1..30)));

			(0..per_post)
				.map(|_| {
					cursor += Duration::minutes(rng.random_range(0..=3) * 30);
					let begin_at = cursor;
					cursor += Duration::minutes(rng.random_range(1..=6) * 30);

					NewBooking {
						author_id: *author_ids.choose(&mut rng).unwrap_or(&author_ids[0]),
						post_id,
						title: Sentence(EN, 1..4).fake_with_rng(&mut rng),
						begin_at,
						end_at: cursor,
					}
				})
				.collect::<Vec<_>>()
		})
		.collect();

	let booking_ids =
		batch_insert(conn, "bookings", bookings, 4096, |conn, chunk| {
			use db::booking::dsl::*;

			diesel::insert_into(booking)
				.values(chunk)
				.returning(id)
				.get_results(conn)
		})
		.await?;

	let approved: Vec<i32> =
		booking_ids.iter().copied().filter(|_| rng.random_bool(0.5)).collect();
	let inserted = booking_ids.len();

	let approved_count = conn
		.interact(move |conn| {
			use db::booking::dsl::*;

			diesel::update(booking.filter(id.eq_any(approved)))
				.set(state.eq(BookingState::Approved))
				.execute(conn)
		})
		.await
		.map_err(io_error)?
		.map_err(io_error)?;

	println!("Approved {approved_count} bookings");

	Ok(inserted)
}
