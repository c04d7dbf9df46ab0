//! User-facing message texts.

use database::{Exercise, Profile};

use crate::streak::{self, Milestone, STREAK_MILESTONE};

pub const START_COMMAND: &str = "/start";
pub const ASK_COMMAND: &str = "/ask";
pub const HELP_COMMAND: &str = "/help";

/// Phrase that acknowledges a finished workout.
pub const DONE_PHRASE: &str = "done";
/// Phrase that acknowledges a skipped workout.
pub const NOT_DONE_PHRASE: &str = "not done";
/// Ends tag selection. Compared case-insensitively.
pub const TAGS_SENTINEL: &str = "done";
/// Declines the feedback comment. Compared case-insensitively.
pub const NO_COMMENT_SENTINEL: &str = "no";
/// Stored in place of a declined comment.
pub const NO_COMMENT_PROVIDED: &str = "no comment provided";

pub const ASK_NAME: &str = "Hi! Let's get you registered. What's your name?";
pub const ASK_NAME_AGAIN: &str = "Creating a new account. What's your name?";
pub const ASK_AGE: &str = "How old are you?";
pub const INVALID_AGE: &str = "Please enter your age as a number.";
pub const ASK_FITNESS_LEVEL: &str = "What is your fitness level?\n\
    1 - Beginner (mostly sedentary)\n\
    2 - Below average (light activity)\n\
    3 - Average (regular workouts)\n\
    4 - Above average (intense workouts)\n\
    5 - High (professional level)";
pub const INVALID_FITNESS_LEVEL: &str = "Please pick one of the offered options using the buttons.";
pub const ASK_TAGS: &str =
    "Pick the kinds of exercises you're interested in (as many as you like). Press 'Done' when finished.";
pub const NO_TAGS_SELECTED: &str = "You haven't picked any type yet. Please pick at least one.";
pub const ASK_REMINDER_TIME: &str =
    "What time should I send your workout reminders? (Use HH:MM, for example 08:00)";
pub const INVALID_TIME_FORMAT: &str = "The time must look like HH:MM, for example 08:30.";
pub const TIME_OUT_OF_RANGE: &str = "Please enter a valid time between 00:00 and 23:59.";
pub const ALREADY_REGISTERED_TAKEN: &str =
    "This chat already has an account. Send /start to continue or replace it.";

pub const CONTINUE_LABEL: &str = "Continue";
pub const CREATE_NEW_LABEL: &str = "Create a new account";
pub const CONTINUING: &str = "Carrying on with your current account 💪";

pub const DONE_LABEL: &str = "Done";
pub const SKIP_LABEL: &str = "Not done";
pub const ANSWER_LABEL: &str = "✉ Answer";

pub const NOT_REGISTERED: &str = "You're not registered yet. Send /start to sign up.";
pub const USER_NOT_FOUND: &str = "User not found.";

pub const SKIPPED: &str = "Too bad you couldn't train today 😔";
pub const ASK_RATING: &str = "How would you rate the workout on a scale of 1 to 5?";
pub const INVALID_RATING: &str = "Please choose a rating from 1 to 5.";
pub const ASK_COMMENT: &str = "Thanks! Want to leave a comment? Just type it, or write 'no'.";
pub const FEEDBACK_THANKS: &str = "Thanks for the feedback!";

pub const FOLLOW_UP: &str = "Did you get your workout in? Write \"done\" 💪";

pub const ASK_USAGE: &str = "Please put your question after the command. For example:\n/ask How should I breathe?";
pub const ASK_REGISTER_FIRST: &str = "You need to register first.";
pub const QUESTION_SENT: &str =
    "Your question was sent to the administrator. They will get back to you if needed.";
pub const QUESTION_SAVED: &str =
    "Your question was saved. The administrator will see it as soon as possible.";
pub const QUESTION_NOT_FOUND: &str = "Question not found or already handled.";
pub const ASK_ANSWER: &str = "Type your answer for the user:";
pub const NOT_ADMIN: &str = "You don't have permission to answer questions.";
pub const ANSWER_SENT: &str = "Answer sent ✅";

pub const UNKNOWN_INPUT: &str = "I didn't get that. Send /help to see what I can do.";

pub const HELP: &str = "Here's what I can do:\n\n\
    /start - register\n\
    /ask [your question] - ask the administrator a question\n\
    \"done\" - mark today's workout as finished\n\
    \"not done\" - mark today's workout as skipped\n\
    /help - show this message";

pub fn already_registered(name: &str) -> String {
    format!("You're already registered as {}. What would you like to do?", name)
}

/// Summary sent after a profile is committed.
pub fn registration_summary(profile: &Profile) -> String {
    let tags = profile.tags.iter().cloned().collect::<Vec<_>>().join(", ");
    format!(
        "Thanks! Here's your data:\n\
         Name: {}\n\
         Age: {}\n\
         Fitness level: {}\n\
         Exercise types: {}\n\
         Reminder time: {}",
        profile.name, profile.age, profile.fitness_level, tags, profile.reminder_time
    )
}

/// Streak message after a finished workout, with the milestone line.
pub fn workout_done(streak: u32) -> String {
    let mut text = format!("Great job 💪 Progress recorded!\nCurrent streak: {} 🔥", streak);
    match streak::milestone(streak) {
        Milestone::Below => {}
        Milestone::Reached => text.push_str(&format!(
            "\n\n🎉 CONGRATULATIONS! You've trained {} days in a row! 🚀",
            STREAK_MILESTONE
        )),
        Milestone::Beyond => text.push_str(&format!(
            "\n💪 You're past the {}-day streak. Keep it up!",
            STREAK_MILESTONE
        )),
    }
    text
}

pub fn history(strip: &str) -> String {
    format!("Progress over the last days:\n{}", strip)
}

/// Reminder with the selected exercise.
pub fn reminder(name: &str, exercise: &Exercise) -> String {
    format!(
        "Hi, {}! 👋\nTime to train 💪\n\n🏋️ {}\n📋 {}\n🔁 {}\n\nPress a button once you're finished.",
        name, exercise.name, exercise.description, exercise.repetitions
    )
}

/// Notice to the administrator about a new question.
pub fn new_question(sender_name: &str, profile_name: &str, chat_id: i64, question: &str) -> String {
    let who = if sender_name.is_empty() || sender_name == profile_name {
        profile_name.to_string()
    } else {
        format!("{} ({})", sender_name, profile_name)
    };
    format!("📩 New question from {} [chat {}]:\n\n{}", who, chat_id, question)
}

pub fn admin_answer(answer: &str) -> String {
    format!("📬 Answer from the administrator:\n\n{}", answer)
}

pub fn answer_failed(reason: &str) -> String {
    format!("Couldn't deliver the message to the user.\n{}", reason)
}
