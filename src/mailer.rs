use std::sync::Arc;
use std::time::Duration;

use common::Error;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use parking_lot::{Condvar, Mutex};
use primitive_author::PrimitiveAuthor;
use tokio::sync::mpsc;

use crate::Config;

/// A basic interface to send email messages
#[derive(Clone, Debug)]
pub struct Mailer {
	from:         Address,
	frontend_url: url::Url,
	send_queue:   mpsc::Sender<Message>,
}

/// A fake mailbox to keep track of mails sent in tests
#[derive(Default)]
pub struct StubMailbox {
	pub mailbox: Mutex<Vec<Message>>,
	pub signal:  Condvar,
}

impl Mailer {
	/// Create a new mailer and spawn its sender task
	///
	/// # Panics
	/// Panics if a stub mailer is expected but not provided
	#[must_use]
	pub fn new(config: &Config, stub_mailer: Option<Arc<StubMailbox>>) -> Self {
		let (tx, rx) = mpsc::channel(config.email_queue_size);

		if config.email_smtp_server == "stub" {
			let Some(stub_mailer) = stub_mailer else {
				panic!("MISSING STUB MAILER");
			};

			tokio::spawn(Self::start_stub_sender(rx, stub_mailer));
		} else {
			tokio::spawn(Self::start_smtp_sender(
				rx,
				config.email_address.clone(),
				config.email_smtp_server.clone(),
				config.email_smtp_password.clone(),
			));
		}

		Self {
			from:         config.email_address.clone(),
			frontend_url: config.frontend_url.clone(),
			send_queue:   tx,
		}
	}

	/// Try to build an email [`Message`]
	///
	/// # Errors
	/// Fails if the receiver or body cannot be parsed
	pub fn try_build_message(
		&self,
		receiver: impl TryInto<Mailbox, Error = impl Into<Error>>,
		subject: &str,
		body: &str,
	) -> Result<Message, Error> {
		Ok(Message::builder()
			.from(Mailbox::new(None, self.from.clone()))
			.to(receiver.try_into().map_err(Into::into)?)
			.subject(subject)
			.body(body.to_string())?)
	}

	/// Try to queue a message without waiting
	///
	/// # Errors
	/// Fails if the mail queue is full
	pub fn try_send(&self, message: Message) -> Result<(), Error> {
		Ok(self.send_queue.try_send(message)?)
	}

	/// Queue the activation mail for a freshly registered author
	///
	/// # Errors
	/// Fails if the author has no activation token, if the message cannot be
	/// built or if the queue is full
	#[instrument(skip(self, author), fields(author = author.id))]
	pub fn send_activation_email(
		&self,
		author: &PrimitiveAuthor,
	) -> Result<(), Error> {
		let Some(token) = author.activation_token.as_deref() else {
			return Err(Error::Infallible(format!(
				"author {} has no activation token",
				author.id
			)));
		};

		let link = self.frontend_url.join(&format!("activate/{token}"))?;

		let body = format!(
			"Hi {},\n\nWelcome to webizcafe! Activate your account by \
			 visiting\n\n{link}\n",
			author.username,
		);

		let message = self.try_build_message(
			author,
			"Activate your webizcafe account",
			&body,
		)?;

		self.try_send(message)?;

		info!("queued activation email for author {}", author.id);

		Ok(())
	}

	/// Keep moving queued mails into a [`StubMailbox`]
	#[instrument(skip_all)]
	async fn start_stub_sender(
		mut rx: mpsc::Receiver<Message>,
		stub_mailer: Arc<StubMailbox>,
	) {
		while let Some(mail) = rx.recv().await {
			let mail_pretty =
				String::from_utf8_lossy(&mail.formatted()).to_string();

			{
				let mut mailbox = stub_mailer.mailbox.lock();
				mailbox.push(mail);
				stub_mailer.signal.notify_all();
			}

			info!(target: "[STUB_MAILER]", "sent email:\n{}\n", mail_pretty);
		}
	}

	/// Keep sending queued mails over SMTP
	#[instrument(skip_all)]
	async fn start_smtp_sender(
		mut rx: mpsc::Receiver<Message>,
		address: Address,
		server: String,
		password: String,
	) {
		let transport = match SmtpTransport::starttls_relay(&server) {
			Ok(t) => {
				t.credentials(Credentials::new(address.to_string(), password))
					.build()
			},
			Err(e) => {
				error!("could not set up SMTP transport for {server}: {e:?}");

				return;
			},
		};

		if let Err(e) = transport.test_connection() {
			error!("SMTP connection to {server} failed: {e:?}");
		}

		while let Some(mail) = rx.recv().await {
			match transport.send(&mail) {
				Ok(res) => info!("sent email: {res:?}"),
				Err(e) => error!("error sending email: {e:?}"),
			}

			tokio::time::sleep(Duration::from_secs(1)).await;
		}
	}
}
