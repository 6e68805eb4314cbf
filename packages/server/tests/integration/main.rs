mod profiles;
mod videos;
